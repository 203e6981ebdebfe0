//! Serializes engine operations behind a single mutex and layers
//! request-counter statistics and periodic tick-driving on top.
//!
//! The facade is the only piece of the core that touches a clock: the
//! matcher itself takes `now`/`before` as plain arguments, which keeps
//! it clock-free and trivially unit-testable. No engine operation
//! suspends or performs I/O while the mutex is held, so a plain
//! blocking `std::sync::Mutex` is the right tool even from inside an
//! async HTTP handler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::engine::Matcher;
use crate::error::{MatchError, Result};

/// The eight request kinds the facade counts independently for `/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Join,
    Status,
    Leave,
    Remove,
    Stats,
    PlayerIds,
    PlayerInQueueIds,
    GroupPlayerIds,
}

const REQUEST_KINDS: [RequestKind; 8] = [
    RequestKind::Join,
    RequestKind::Status,
    RequestKind::Leave,
    RequestKind::Remove,
    RequestKind::Stats,
    RequestKind::PlayerIds,
    RequestKind::PlayerInQueueIds,
    RequestKind::GroupPlayerIds,
];

impl RequestKind {
    fn label(self) -> &'static str {
        match self {
            RequestKind::Join => "join",
            RequestKind::Status => "status",
            RequestKind::Leave => "leave",
            RequestKind::Remove => "remove",
            RequestKind::Stats => "stats",
            RequestKind::PlayerIds => "player_ids",
            RequestKind::PlayerInQueueIds => "player_in_queue_ids",
            RequestKind::GroupPlayerIds => "group_player_ids",
        }
    }

    fn index(self) -> usize {
        REQUEST_KINDS.iter().position(|k| *k == self).unwrap()
    }
}

#[derive(Default)]
struct RequestCounters {
    counts: [AtomicU64; 8],
}

impl RequestCounters {
    fn record(&self, kind: RequestKind) {
        self.counts[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> [u64; 8] {
        let mut out = [0u64; 8];
        for (i, c) in self.counts.iter().enumerate() {
            out[i] = c.load(Ordering::Relaxed);
        }
        out
    }
}

struct PrevSnapshot {
    at: Instant,
    counts: [u64; 8],
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub player_count: u64,
    pub player_in_queue_count: u64,
    pub player_not_removed_count: u64,
    pub group_count: u64,
    pub group_standard_deviation: f64,
    pub average_wait_time: f64,
    pub server_running_time: u64,
    pub requests: std::collections::HashMap<&'static str, RequestStat>,
}

#[derive(Debug, Serialize)]
pub struct RequestStat {
    pub count: u64,
    pub qps: f64,
}

/// Owns the matcher and the single mutex serializing every call into
/// it, plus atomic request-arrival counters that are updated without
/// the lock (counter reads are best-effort observational, not atomic
/// with engine state).
pub struct ServerFacade {
    matcher: Mutex<Matcher>,
    counters: RequestCounters,
    prev_snapshot: Mutex<Option<PrevSnapshot>>,
    started_at: Instant,
    shutdown: std::sync::atomic::AtomicBool,
}

impl ServerFacade {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            matcher: Mutex::new(matcher),
            counters: RequestCounters::default(),
            prev_snapshot: Mutex::new(None),
            started_at: Instant::now(),
            shutdown: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn now_seconds() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    pub fn record_request(&self, kind: RequestKind) {
        self.counters.record(kind);
    }

    pub fn join(&self, id: &str, score: i64) -> Result<i64> {
        let now = Self::now_seconds();
        let mut matcher = self.matcher.lock().expect("engine mutex poisoned");
        matcher.join_queue(id, now, score)?;
        Ok(matcher.get_wait_time_by_score(score))
    }

    pub fn status(&self, id: &str) -> Result<Vec<String>> {
        let matcher = self.matcher.lock().expect("engine mutex poisoned");
        matcher.get_matched_players(id)
    }

    pub fn leave(&self, id: &str) -> Result<()> {
        let mut matcher = self.matcher.lock().expect("engine mutex poisoned");
        matcher.leave_queue(id)
    }

    pub fn remove(&self, id: &str) {
        let mut matcher = self.matcher.lock().expect("engine mutex poisoned");
        matcher.remove(id);
    }

    pub fn player_ids(&self) -> Vec<String> {
        self.matcher.lock().expect("engine mutex poisoned").player_ids()
    }

    pub fn player_in_queue_ids(&self) -> Vec<String> {
        self.matcher
            .lock()
            .expect("engine mutex poisoned")
            .player_in_queue_ids()
    }

    pub fn group_player_ids(&self) -> Vec<String> {
        self.matcher
            .lock()
            .expect("engine mutex poisoned")
            .group_player_ids()
    }

    /// Runs a `Match` tick. Called by the background matcher ticker.
    pub fn run_match(&self, match_count: usize) {
        let now = Self::now_seconds();
        let mut matcher = self.matcher.lock().expect("engine mutex poisoned");
        matcher.run_match(now, match_count);
    }

    /// Runs a `Sweep` tick. Called by the background sweeper ticker.
    pub fn run_sweep(&self, max_time: i64) {
        let now = Self::now_seconds();
        let mut matcher = self.matcher.lock().expect("engine mutex poisoned");
        matcher.sweep(now - 2 * max_time);
    }

    /// Snapshots engine-state fields under the lock, then reads the
    /// independently-tracked atomic request counters. The two halves
    /// are each internally consistent but not mutually atomic.
    pub fn stats(&self) -> Stats {
        let now = Self::now_seconds();
        let (player_count, player_in_queue_count, player_not_removed_count, group_count, sd, awt) = {
            let matcher = self.matcher.lock().expect("engine mutex poisoned");
            (
                matcher.player_count() as u64,
                matcher.player_in_queue_count() as u64,
                matcher.player_not_removed_count() as u64,
                matcher.group_count() as u64,
                matcher.group_standard_deviation(),
                matcher.average_wait_time(now),
            )
        };

        let current = self.counters.snapshot();
        let elapsed_and_prev = {
            let mut guard = self.prev_snapshot.lock().expect("snapshot mutex poisoned");
            let at = Instant::now();
            let prev = guard.take();
            *guard = Some(PrevSnapshot { at, counts: current });
            prev
        };

        let mut requests = std::collections::HashMap::new();
        for kind in REQUEST_KINDS {
            let idx = kind.index();
            let count = current[idx];
            let qps = match &elapsed_and_prev {
                Some(prev) => {
                    let elapsed = prev.at.elapsed().as_secs_f64();
                    if elapsed > 0.0 {
                        (count.saturating_sub(prev.counts[idx])) as f64 / elapsed
                    } else {
                        0.0
                    }
                }
                None => 0.0,
            };
            requests.insert(kind.label(), RequestStat { count, qps });
        }

        Stats {
            player_count,
            player_in_queue_count,
            player_not_removed_count,
            group_count,
            group_standard_deviation: sd,
            average_wait_time: awt,
            server_running_time: self.started_at.elapsed().as_secs(),
            requests,
        }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}
