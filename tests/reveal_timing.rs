use std::collections::BTreeMap;

use outrank_live::config::RevealConfig;
use outrank_live::domain::ledger::{LedgerEvent, new_ids_oldest_first};
use outrank_live::domain::reveal::RevealQueue;

/// Run the queue the way the browser timer does: wake at each deadline.
fn drive(queue: &mut RevealQueue, mut now: f64) -> (BTreeMap<String, f64>, BTreeMap<String, f64>) {
    let mut started = BTreeMap::new();
    let mut finished = BTreeMap::new();
    for _ in 0..100 {
        let step = queue.advance(now);
        for id in step.started {
            started.insert(id, now);
        }
        for id in step.finished {
            finished.insert(id, now);
        }
        match queue.next_deadline() {
            Some(at) => now = at.max(now),
            None => break,
        }
    }
    (started, finished)
}

#[test]
fn burst_is_revealed_one_per_cadence() {
    let mut queue = RevealQueue::new(RevealConfig::default());
    let ids: Vec<String> = (1..=5).map(|i| format!("e{i}")).collect();
    queue.enqueue(ids, 0.0);

    let (started, finished) = drive(&mut queue, 0.0);
    assert_eq!(started["e1"], 0.0);
    assert!(started["e5"] - started["e1"] >= 2_000.0);
    for (id, at) in &started {
        assert!(finished[id] - at >= 1_000.0, "{id} highlighted too briefly");
    }
    assert!(queue.is_idle());
}

#[test]
fn later_arrivals_join_the_queue() {
    let mut queue = RevealQueue::new(RevealConfig::default());
    queue.enqueue(vec!["a".to_string()], 0.0);
    assert_eq!(queue.advance(0.0).started, vec!["a".to_string()]);

    queue.enqueue(vec!["b".to_string(), "c".to_string()], 100.0);
    assert_eq!(queue.pending_len(), 2);
    let step = queue.advance(100.0);
    assert_eq!(step.started, vec!["b".to_string()]);
    assert!(queue.is_animating("a") && queue.is_animating("b"));
    assert!(queue.advance(400.0).started.is_empty());
    assert_eq!(queue.advance(600.0).started, vec!["c".to_string()]);
}

#[test]
fn clear_stops_everything() {
    let mut queue = RevealQueue::new(RevealConfig::default());
    queue.enqueue(vec!["a".to_string(), "b".to_string()], 0.0);
    queue.advance(0.0);
    queue.clear();
    assert!(queue.is_idle());
    assert_eq!(queue.next_deadline(), None);
}

fn event(id: &str) -> LedgerEvent {
    LedgerEvent {
        id: id.into(),
        reason: "winnings".into(),
        amount: 10.0,
        asset: Some("BTC".into()),
        mode: Some("15min".into()),
        kickoff_at: None,
        interval_label: None,
    }
}

#[test]
fn new_ledger_rows_are_revealed_oldest_first() {
    let previous = vec![event("3"), event("2")];
    let latest = vec![event("5"), event("4"), event("3"), event("2")];
    assert_eq!(new_ids_oldest_first(&previous, &latest), vec!["4".to_string(), "5".to_string()]);
    assert!(new_ids_oldest_first(&latest, &latest).is_empty());
}

#[test]
fn ledger_rows_render_their_summary() {
    let tip = LedgerEvent { reason: "tip".into(), amount: -300.0, ..event("t") };
    assert_eq!(tip.title(), "Tip sent");
    assert_eq!(event("w").details().as_deref(), Some("BTC · 15min"));

    let parsed: Vec<LedgerEvent> = serde_json::from_str(
        r#"[{"id":"x","reason":"stake","amount":-50,"asset":"ETH","kickoffAt":"2025-01-01T00:00:00Z"}]"#,
    )
    .unwrap();
    assert_eq!(parsed[0].kickoff_at.as_deref(), Some("2025-01-01T00:00:00Z"));
    assert!(!parsed[0].is_credit());
}
