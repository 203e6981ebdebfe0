//! The matching engine: player registry, join-time queue, spatial
//! index, wait estimator and the group table, wired together behind
//! the operations the facade calls.

use std::collections::{BTreeSet, HashMap};
use std::ops::ControlFlow;

use crate::error::{MatchError, Result};

use super::estimator::WaitEstimator;
use super::grid::TimeScoreGrid;
use super::group::{Group, GroupMember};

#[derive(Debug, Clone, Copy)]
struct PlayerRecord {
    join_time: i64,
    score: i64,
    group: Option<u64>,
}

/// Invoked once per group as soon as it's formed, while the engine
/// lock is still held by the caller.
pub type GroupMatchedCallback = Box<dyn Fn(&Group) + Send + Sync>;

/// Computes the acceptable score half-width for a player who has been
/// waiting `dt` seconds. The default installed by `Matcher::new`
/// widens from `max_score/8` at `dt=0`, overshooting `max_score` before
/// `dt` reaches `max_time`, then clamps to `max_score` beyond it.
pub type ScoreRadiusFn = Box<dyn Fn(i64) -> i64 + Send + Sync>;

fn default_score_radius_fn(max_score: i64, max_time: i64) -> ScoreRadiusFn {
    Box::new(move |dt: i64| -> i64 {
        if dt > max_time {
            return max_score;
        }
        let denom = (max_time * 7 / 8).max(1);
        max_score / 8 + max_score * dt / denom
    })
}

fn clamp_band(band: i64, group_count: i64) -> usize {
    band.clamp(0, (group_count - 1).max(0)) as usize
}

/// Owns all matching state and implements the engine's operations.
///
/// The matcher never reads the wall clock itself: every time-dependent
/// operation takes `now` (or `before`) as an explicit argument, which
/// keeps it trivially unit-testable with synthetic times and leaves
/// all clock access to the facade.
pub struct Matcher {
    max_time: i64,
    max_score: i64,
    score_group_len: i64,
    score_group_count: i64,
    grid_x_len: i64,

    players: HashMap<String, PlayerRecord>,
    queue: BTreeSet<(i64, String)>,
    grid: TimeScoreGrid,
    groups: HashMap<u64, Group>,
    next_group_id: u64,
    wait_estimator: WaitEstimator,

    score_radius_fn: ScoreRadiusFn,
    on_group_matched: Option<GroupMatchedCallback>,
}

impl Matcher {
    /// Derives the grid and band layout from `(max_time, max_score,
    /// score_group_len)`. Rejects configurations that would blow up the
    /// score-band count or divide by zero.
    pub fn new(max_time: i64, max_score: i64, score_group_len: i64) -> Result<Self> {
        if score_group_len <= 0 {
            return Err(MatchError::ConfigurationRejected(
                "score_group_len must be positive".to_string(),
            ));
        }
        let score_group_count = max_score / score_group_len;
        if score_group_count > 1000 {
            return Err(MatchError::ConfigurationRejected(format!(
                "score_group_count {score_group_count} exceeds 1000"
            )));
        }
        let score_group_count = score_group_count.max(1);

        let time_group_len = (max_time / 60).clamp(3, 10);
        let time_group_count = (max_time / time_group_len).max(1);
        let grid_x_len = time_group_count * time_group_len;

        let grid = TimeScoreGrid::new(
            time_group_count,
            score_group_count,
            time_group_len,
            score_group_len,
        );
        let wait_estimator = WaitEstimator::new(score_group_count as usize, max_time);
        let score_radius_fn = default_score_radius_fn(max_score, max_time);

        Ok(Self {
            max_time,
            max_score,
            score_group_len,
            score_group_count,
            grid_x_len,
            players: HashMap::new(),
            queue: BTreeSet::new(),
            grid,
            groups: HashMap::new(),
            next_group_id: 1,
            wait_estimator,
            score_radius_fn,
            on_group_matched: None,
        })
    }

    /// Overrides the default score-radius widening function.
    pub fn set_score_radius_fn(&mut self, f: ScoreRadiusFn) {
        self.score_radius_fn = f;
    }

    /// Registers a callback invoked synchronously each time a group forms.
    pub fn set_group_matched_callback(&mut self, cb: GroupMatchedCallback) {
        self.on_group_matched = Some(cb);
    }

    fn score_band(&self, score: i64) -> usize {
        clamp_band(score / self.score_group_len, self.score_group_count)
    }

    pub fn max_time(&self) -> i64 {
        self.max_time
    }

    pub fn grid_x_len(&self) -> i64 {
        self.grid_x_len
    }

    // ---- registry-level queries -------------------------------------------------

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player_in_queue_count(&self) -> usize {
        self.queue.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn player_ids(&self) -> Vec<String> {
        self.players.keys().cloned().collect()
    }

    pub fn player_in_queue_ids(&self) -> Vec<String> {
        self.queue.iter().map(|(_, id)| id.clone()).collect()
    }

    pub fn group_player_ids(&self) -> Vec<String> {
        self.groups
            .values()
            .flat_map(|g| g.all_player_ids())
            .collect()
    }

    pub fn player_not_removed_count(&self) -> usize {
        self.groups.values().map(|g| g.player_not_removed_count()).sum()
    }

    /// Mean of each retained group's population standard deviation of
    /// member scores; `0.0` when there are no groups.
    pub fn group_standard_deviation(&self) -> f64 {
        if self.groups.is_empty() {
            return 0.0;
        }
        let total: f64 = self.groups.values().map(|g| g.standard_deviation()).sum();
        total / self.groups.len() as f64
    }

    /// Mean of each retained group's average wait time at `now`;
    /// `0.0` when there are no groups.
    pub fn average_wait_time(&self, now: i64) -> f64 {
        if self.groups.is_empty() {
            return 0.0;
        }
        let total: f64 = self.groups.values().map(|g| g.average_wait_time(now)).sum();
        total / self.groups.len() as f64
    }

    // ---- engine API --------------------------------------------------------------

    pub fn join_queue(&mut self, id: &str, join_time: i64, score: i64) -> Result<()> {
        if self.players.contains_key(id) {
            return Err(MatchError::PlayerAlreadyExists(id.to_string()));
        }
        self.players.insert(
            id.to_string(),
            PlayerRecord {
                join_time,
                score,
                group: None,
            },
        );
        self.queue.insert((join_time, id.to_string()));
        self.grid.add(join_time, score, id);
        Ok(())
    }

    pub fn leave_queue(&mut self, id: &str) -> Result<()> {
        let record = self
            .players
            .get(id)
            .ok_or_else(|| MatchError::PlayerNotExists(id.to_string()))?;
        if record.group.is_some() {
            return Err(MatchError::PlayerAlreadyMatched(id.to_string()));
        }
        let (join_time, score) = (record.join_time, record.score);
        self.queue.remove(&(join_time, id.to_string()));
        self.grid.del(join_time, score, id);
        self.players.remove(id);
        Ok(())
    }

    /// Removes a player wherever they are. Queued players are dropped
    /// from the registry, queue and grid; matched players are
    /// soft-removed from their group, which is dropped once empty.
    /// Never errors; unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) {
        let Some(record) = self.players.remove(id) else {
            return;
        };
        match record.group {
            Some(group_id) => {
                if let Some(group) = self.groups.get_mut(&group_id) {
                    group.soft_remove(id);
                    if group.is_empty() {
                        self.groups.remove(&group_id);
                    }
                }
            }
            None => {
                self.queue.remove(&(record.join_time, id.to_string()));
                self.grid.del(record.join_time, record.score, id);
            }
        }
    }

    pub fn get_matched_players(&self, id: &str) -> Result<Vec<String>> {
        let record = self
            .players
            .get(id)
            .ok_or_else(|| MatchError::PlayerNotExists(id.to_string()))?;
        let group_id = record
            .group
            .ok_or_else(|| MatchError::PlayerNotMatched(id.to_string()))?;
        let group = self
            .groups
            .get(&group_id)
            .expect("group back-reference must point at a live group");
        Ok(group.all_player_ids())
    }

    pub fn get_player_approx_wait_time(&self, id: &str) -> Result<i64> {
        let record = self
            .players
            .get(id)
            .ok_or_else(|| MatchError::PlayerNotExists(id.to_string()))?;
        if record.group.is_some() {
            return Err(MatchError::PlayerAlreadyMatched(id.to_string()));
        }
        Ok(self.wait_estimator.estimate(self.score_band(record.score)))
    }

    pub fn get_wait_time_by_score(&self, score: i64) -> i64 {
        self.wait_estimator.estimate(self.score_band(score))
    }

    /// Drops every queued player whose join time has aged out of the
    /// cyclic time window (`join_time <= now - grid_x_len`).
    fn auto_remove(&mut self, now: i64) {
        let threshold = now - self.grid_x_len;
        let stale: Vec<String> = self
            .queue
            .iter()
            .take_while(|(t, _)| *t <= threshold)
            .map(|(_, id)| id.clone())
            .collect();
        for id in stale {
            self.remove(&id);
        }
    }

    /// Runs one matching pass: ages out stale queue entries, advances
    /// the wait estimator's clock, scans the queue in join-time order
    /// forming groups, then merges the estimator's per-pass buffers.
    pub fn run_match(&mut self, now: i64, count: usize) {
        self.auto_remove(now);
        self.wait_estimator.add_time_auto(now);

        let start_time = self
            .queue
            .iter()
            .next()
            .map(|(t, _)| *t)
            .unwrap_or(now);

        let candidates: Vec<String> = self
            .queue
            .iter()
            .take_while(|(t, _)| *t <= now)
            .map(|(_, id)| id.clone())
            .collect();

        for id in candidates {
            self.match_for_player(&id, now, count, start_time);
        }

        self.wait_estimator.merge();
    }

    /// Attempts to fill a group around `id`. No-ops silently if `id` is
    /// no longer queued (it may have been swept into an earlier
    /// group during this same pass).
    fn match_for_player(&mut self, id: &str, now: i64, count: usize, start_time: i64) {
        let Some(record) = self.players.get(id) else {
            return;
        };
        if record.group.is_some() {
            return;
        }
        let (join_time, score) = (record.join_time, record.score);
        let dt = now - join_time;
        let radius = (self.score_radius_fn)(dt);

        let mut buffer: Vec<String> = Vec::with_capacity(count);
        let players = &self.players;
        self.grid.enumerate(start_time, now, score, radius, |candidate| {
            if let Some(r) = players.get(candidate) {
                if r.group.is_none() {
                    buffer.push(candidate.to_string());
                    if buffer.len() >= count {
                        return ControlFlow::Break(());
                    }
                }
            }
            ControlFlow::Continue(())
        });

        if buffer.len() < count {
            return;
        }

        let group_id = self.next_group_id;
        self.next_group_id += 1;

        let members: Vec<GroupMember> = buffer
            .iter()
            .map(|pid| {
                let r = self.players.get(pid).expect("candidate must still be registered");
                GroupMember {
                    id: pid.clone(),
                    join_time: r.join_time,
                    score: r.score,
                }
            })
            .collect();

        for pid in &buffer {
            if let Some(r) = self.players.get_mut(pid) {
                self.queue.remove(&(r.join_time, pid.clone()));
                self.grid.del(r.join_time, r.score, pid);
                let band = clamp_band(r.score / self.score_group_len, self.score_group_count);
                self.wait_estimator.add_item(band, now - r.join_time);
                r.group = Some(group_id);
            }
        }

        let group = Group::new(group_id, members);
        self.groups.insert(group_id, group);
        if let Some(cb) = &self.on_group_matched {
            cb(self.groups.get(&group_id).expect("just inserted"));
        }
    }

    /// Removes every player (queued or matched) whose join time is
    /// strictly older than `before`.
    pub fn sweep(&mut self, before: i64) {
        let stale: Vec<String> = self
            .players
            .iter()
            .filter(|(_, r)| r.join_time < before)
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            self.remove(&id);
        }
    }

    /// Checks the invariants in the testable-properties section; used
    /// by tests, not part of the public operational surface.
    #[cfg(test)]
    fn check_invariants(&self) {
        for (id, record) in &self.players {
            let in_queue = self.queue.contains(&(record.join_time, id.clone()));
            match record.group {
                None => assert!(in_queue, "queued player {id} missing from queue"),
                Some(gid) => {
                    assert!(!in_queue, "matched player {id} still in queue");
                    let group = self.groups.get(&gid).expect("dangling group reference");
                    assert!(
                        group.all_player_ids().contains(&id.clone()),
                        "player {id} not present in its own group"
                    );
                }
            }
        }
        for group in self.groups.values() {
            assert!(group.removed_count() < group.members().len());
        }
    }
}
