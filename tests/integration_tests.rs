//! Integration tests driving the engine through `ServerFacade`, the
//! same surface the HTTP layer calls into.

use gridmatch::engine::Matcher;
use gridmatch::facade::{RequestKind, ServerFacade};
use gridmatch::MatchError;

fn facade(max_time: i64, max_score: i64, score_group_len: i64) -> ServerFacade {
    ServerFacade::new(Matcher::new(max_time, max_score, score_group_len).unwrap())
}

#[test]
fn join_reports_a_wait_time_hint_before_any_match_runs() {
    let f = facade(180, 300, 10);
    let wait = f.join("alice", 150).unwrap();
    assert_eq!(wait, 180, "fresh estimate equals the configured max wait");
}

#[test]
fn duplicate_join_is_rejected() {
    let f = facade(180, 300, 10);
    f.join("alice", 150).unwrap();
    assert!(matches!(f.join("alice", 151), Err(MatchError::PlayerAlreadyExists(_))));
}

#[test]
fn status_before_a_match_pass_reports_not_matched() {
    let f = facade(180, 300, 10);
    f.join("alice", 150).unwrap();
    assert!(matches!(f.status("alice"), Err(MatchError::PlayerNotMatched(_))));
}

#[test]
fn status_unknown_player_reports_not_exists() {
    let f = facade(180, 300, 10);
    assert!(matches!(f.status("ghost"), Err(MatchError::PlayerNotExists(_))));
}

#[test]
fn remove_never_errors_even_for_unknown_players() {
    let f = facade(180, 300, 10);
    f.remove("ghost");
    f.remove("ghost");
}

#[test]
fn group_player_ids_reflects_formed_groups_only() {
    let f = facade(180, 300, 10);
    f.join("alice", 100).unwrap();
    f.join("bob", 102).unwrap();
    assert!(f.group_player_ids().is_empty());
    drop(f);

    // Drive a match pass directly through the matcher so the test
    // doesn't depend on wall-clock timing between join and match.
    let now = ServerFacade::now_seconds();
    let mut matcher = Matcher::new(180, 300, 10).unwrap();
    matcher.join_queue("alice", now, 100).unwrap();
    matcher.join_queue("bob", now, 102).unwrap();
    matcher.run_match(now, 2);
    assert_eq!(matcher.group_count(), 1);
    let mut ids = matcher.group_player_ids();
    ids.sort();
    assert_eq!(ids, vec!["alice".to_string(), "bob".to_string()]);
}

#[test]
fn leave_after_match_is_rejected_with_already_matched() {
    let now = ServerFacade::now_seconds();
    let mut matcher = Matcher::new(180, 300, 10).unwrap();
    matcher.join_queue("alice", now, 100).unwrap();
    matcher.join_queue("bob", now, 102).unwrap();
    matcher.run_match(now, 2);
    assert!(matches!(
        matcher.leave_queue("alice"),
        Err(MatchError::PlayerAlreadyMatched(_))
    ));
}

#[test]
fn stats_counts_requests_per_kind() {
    let f = facade(180, 300, 10);
    f.record_request(RequestKind::Join);
    f.record_request(RequestKind::Join);
    f.record_request(RequestKind::Stats);

    let stats = f.stats();
    assert_eq!(stats.requests["join"].count, 2);
    assert_eq!(stats.requests["stats"].count, 1);
    assert_eq!(stats.player_count, 0);
    assert_eq!(stats.group_count, 0);
}

#[test]
fn configuration_with_too_many_score_bands_is_rejected_at_construction() {
    let err = Matcher::new(180, 1_000_000, 1).unwrap_err();
    assert!(matches!(err, MatchError::ConfigurationRejected(_)));
}

#[test]
fn sweep_removes_players_older_than_the_cutoff_regardless_of_queue_state() {
    let mut matcher = Matcher::new(180, 300, 10).unwrap();
    matcher.join_queue("alice", 0, 100).unwrap();
    matcher.join_queue("bob", 0, 102).unwrap();
    matcher.run_match(0, 2);
    assert_eq!(matcher.group_count(), 1);

    matcher.sweep(1);
    assert_eq!(matcher.player_count(), 0);
    assert_eq!(matcher.group_count(), 0);
}

#[test]
fn wait_time_by_score_never_errors_for_out_of_range_scores() {
    let matcher = Matcher::new(180, 300, 10).unwrap();
    let below = matcher.get_wait_time_by_score(-5);
    let above = matcher.get_wait_time_by_score(10_000);
    assert_eq!(below, 180);
    assert_eq!(above, 180);
}
