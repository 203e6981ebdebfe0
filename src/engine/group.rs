//! Fixed-size immutable player group with soft-removal bookkeeping.

/// A snapshot of a player as it was at the moment it joined a group:
/// the group's own statistics stay computable after the registry entry
/// for a soft-removed member is long gone.
#[derive(Debug, Clone)]
pub struct GroupMember {
    pub id: String,
    pub join_time: i64,
    pub score: i64,
}

/// A fixed-capacity set of matched players.
///
/// `members` is populated once at construction and never reordered;
/// `removed` is a parallel bit-vector of soft-removals. A group is kept
/// alive by its owner as long as `removed_count < members.len()`.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: u64,
    members: Vec<GroupMember>,
    removed: Vec<bool>,
    removed_count: usize,
}

impl Group {
    pub fn new(id: u64, members: Vec<GroupMember>) -> Self {
        let removed = vec![false; members.len()];
        Self {
            id,
            members,
            removed,
            removed_count: 0,
        }
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Marks the first not-yet-removed member matching `player_id` as
    /// removed. Returns `true` if a member was removed.
    pub fn soft_remove(&mut self, player_id: &str) -> bool {
        if let Some(idx) = self
            .members
            .iter()
            .zip(self.removed.iter())
            .position(|(m, removed)| !*removed && m.id == player_id)
        {
            self.removed[idx] = true;
            self.removed_count += 1;
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed_count >= self.members.len()
    }

    pub fn removed_count(&self) -> usize {
        self.removed_count
    }

    /// Population standard deviation of member scores over the full,
    /// original membership (removed or not).
    pub fn standard_deviation(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        let n = self.members.len() as f64;
        let mean = self.members.iter().map(|m| m.score as f64).sum::<f64>() / n;
        let variance = self
            .members
            .iter()
            .map(|m| {
                let d = m.score as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        variance.sqrt()
    }

    /// Mean of `now - join_time` over the full, original membership.
    pub fn average_wait_time(&self, now: i64) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        let n = self.members.len() as f64;
        self.members
            .iter()
            .map(|m| (now - m.join_time) as f64)
            .sum::<f64>()
            / n
    }

    pub fn player_not_removed_count(&self) -> usize {
        self.members.len() - self.removed_count
    }

    pub fn player_not_removed_ids(&self) -> Vec<String> {
        self.members
            .iter()
            .zip(self.removed.iter())
            .filter(|(_, removed)| !**removed)
            .map(|(m, _)| m.id.clone())
            .collect()
    }

    pub fn all_player_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, join_time: i64, score: i64) -> GroupMember {
        GroupMember {
            id: id.to_string(),
            join_time,
            score,
        }
    }

    #[test]
    fn soft_remove_then_is_empty() {
        let mut g = Group::new(1, vec![member("a", 0, 100), member("b", 0, 110)]);
        assert!(!g.is_empty());
        assert!(g.soft_remove("a"));
        assert_eq!(g.removed_count(), 1);
        assert!(!g.is_empty());
        assert!(g.soft_remove("b"));
        assert!(g.is_empty());
    }

    #[test]
    fn soft_remove_unknown_is_noop() {
        let mut g = Group::new(1, vec![member("a", 0, 100)]);
        assert!(!g.soft_remove("ghost"));
        assert_eq!(g.removed_count(), 0);
    }

    #[test]
    fn statistics_use_full_membership_regardless_of_removal() {
        let mut g = Group::new(1, vec![member("a", 0, 100), member("b", 0, 200)]);
        let sd_before = g.standard_deviation();
        g.soft_remove("a");
        assert_eq!(g.standard_deviation(), sd_before);
        assert_eq!(g.player_not_removed_count(), 1);
        assert_eq!(g.player_not_removed_ids(), vec!["b".to_string()]);
    }
}
