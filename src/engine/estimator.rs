//! Per-score-band wait-time estimator.
//!
//! Each band holds a scalar estimate of mean wait time, smoothed across
//! a matching pass and blurred across neighboring bands so that sparse
//! samples in one band don't produce a noisy estimate.

/// 5-tap Gaussian kernel used to blur a band's estimate with its
/// neighbors during `merge`.
const BLUR_WEIGHTS: [f64; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];

#[derive(Debug, Clone)]
pub struct WaitEstimator {
    max_wait_time: f64,
    groups: Vec<f64>,
    group_buffers: Vec<f64>,
    group_buffer_item_counts: Vec<u64>,
    last_time: Option<i64>,
}

impl WaitEstimator {
    pub fn new(group_count: usize, max_wait_time: i64) -> Self {
        let max_wait_time = max_wait_time as f64;
        Self {
            max_wait_time,
            groups: vec![max_wait_time; group_count],
            group_buffers: vec![0.0; group_count],
            group_buffer_item_counts: vec![0; group_count],
            last_time: None,
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Current estimate for `band`, in seconds.
    pub fn estimate(&self, band: usize) -> i64 {
        self.groups.get(band).copied().unwrap_or(self.max_wait_time).round() as i64
    }

    /// Accumulates a single matched player's observed wait into `band`'s buffer.
    pub fn add_item(&mut self, band: usize, wait_seconds: i64) {
        if band >= self.groups.len() {
            return;
        }
        self.group_buffers[band] += wait_seconds as f64;
        self.group_buffer_item_counts[band] += 1;
    }

    /// On the first call, records `current_time` as the baseline. On
    /// later calls, adds the elapsed time since the previous call to
    /// every band's estimate, so bands that produce no matches drift
    /// upward.
    pub fn add_time_auto(&mut self, current_time: i64) {
        match self.last_time {
            None => self.last_time = Some(current_time),
            Some(prev) => {
                let elapsed = (current_time - prev).max(0) as f64;
                if elapsed > 0.0 {
                    for g in &mut self.groups {
                        *g += elapsed;
                    }
                }
                self.last_time = Some(current_time);
            }
        }
    }

    /// Folds this pass's buffered samples into each band's estimate,
    /// blurring across `i-2 ..= i+2` with weights `{1,4,6,4,1}`, then
    /// clears the buffers and clamps every estimate to `[0, max_wait_time]`.
    pub fn merge(&mut self) {
        let n = self.groups.len();
        if n == 0 {
            return;
        }

        // Feed the current estimate back into its own buffer as a
        // synthetic sample before any blending happens.
        for i in 0..n {
            self.group_buffers[i] += self.groups[i];
            self.group_buffer_item_counts[i] += 1;
        }

        let mut blurred = self.groups.clone();
        for i in 0..n {
            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            for (tap, weight) in BLUR_WEIGHTS.iter().enumerate() {
                let offset = tap as i64 - 2;
                // Edge bands clamp rather than drop: a tap that would run
                // off either end re-reads the boundary band's own sample.
                let j = (i as i64 + offset).clamp(0, n as i64 - 1) as usize;
                if self.group_buffer_item_counts[j] == 0 {
                    continue;
                }
                weighted_sum += self.group_buffers[j] * weight;
                weight_total += self.group_buffer_item_counts[j] as f64 * weight;
            }
            if weight_total > 0.0 {
                blurred[i] = weighted_sum / weight_total;
            }
        }
        self.groups = blurred;

        for g in &mut self.groups {
            *g = g.clamp(0.0, self.max_wait_time);
        }
        self.group_buffers.iter_mut().for_each(|b| *b = 0.0);
        self.group_buffer_item_counts.iter_mut().for_each(|c| *c = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializes_to_max_wait_time() {
        let est = WaitEstimator::new(5, 180);
        for i in 0..5 {
            assert_eq!(est.estimate(i), 180);
        }
    }

    #[test]
    fn add_time_auto_drifts_with_no_first_call_jump() {
        let mut est = WaitEstimator::new(3, 180);
        est.add_time_auto(100);
        assert_eq!(est.estimate(0), 180);
        est.add_time_auto(101);
        assert_eq!(est.estimate(0), 181);
    }

    #[test]
    fn merge_clamps_within_bounds() {
        let mut est = WaitEstimator::new(3, 180);
        for _ in 0..5 {
            est.add_time_auto(est.last_time.unwrap_or(0) + 1);
            est.merge();
        }
        for i in 0..3 {
            assert!(est.estimate(i) <= 180);
            assert!(est.estimate(i) >= 0);
        }
    }

    #[test]
    fn add_item_pulls_estimate_toward_observed_wait() {
        let mut est = WaitEstimator::new(1, 180);
        est.add_time_auto(0);
        est.add_item(0, 10);
        est.merge();
        assert!(est.estimate(0) < 180);
    }

    #[test]
    fn merge_weights_taps_by_sample_count_not_band_mean() {
        // Band 0 holds one sample summing to 10, band 1 holds five
        // samples summing to 60 (seeded at counts [0, 4] so the self-feed
        // step in `merge` brings them to [1, 5]). Pooling the raw sums
        // and counts gives (10+60)/(1+5) = 11.67, not the mean-of-means
        // (10/1 + 60/5)/2 = 11 a band-mean blend would produce.
        let mut est = WaitEstimator::new(2, 180);
        est.group_buffers[0] = 10.0;
        est.group_buffer_item_counts[0] = 0;
        est.group_buffers[1] = 60.0;
        est.group_buffer_item_counts[1] = 4;
        est.groups = vec![0.0, 0.0];
        est.merge();
        assert!((est.estimate(0) as f64 - 11.67).abs() <= 1.0);
    }
}
