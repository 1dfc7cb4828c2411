#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::future::sleep;
use outrank_live::config::FeedConfig;
use outrank_live::domain::feed::{ConnectionState, FeedHandlers, FeedParams};
use outrank_live::infrastructure::websocket::LiveFeedClient;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test(async)]
async fn empty_game_id_never_connects() {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let handlers = FeedHandlers::new().on_connection(move |_| c.set(c.get() + 1));
    let mut client = LiveFeedClient::connect(
        FeedParams::new("", None, None),
        FeedConfig::default(),
        handlers,
    );

    sleep(Duration::from_millis(50)).await;
    assert!(!client.connected());
    assert_eq!(calls.get(), 0);
    client.teardown();
    client.teardown();
}

#[wasm_bindgen_test(async)]
async fn unreachable_host_schedules_a_single_retry() {
    let config = FeedConfig { host: "127.0.0.1:9".into(), ..FeedConfig::default() };
    let downs = Rc::new(Cell::new(0));
    let d = downs.clone();
    let handlers = FeedHandlers::new().on_connection(move |up| {
        if !up {
            d.set(d.get() + 1);
        }
    });
    let mut client =
        LiveFeedClient::connect(FeedParams::new("g1", None, None), config, handlers);

    sleep(Duration::from_millis(500)).await;
    assert!(!client.connected());
    assert_eq!(client.state(), ConnectionState::Closed { will_retry: true });
    assert_eq!(downs.get(), 1);

    client.teardown();
    assert_eq!(client.state(), ConnectionState::Closed { will_retry: false });
}

#[wasm_bindgen_test]
fn histogram_helper_returns_json() {
    let peers = r#"[{"alias":"a","interval_label":"T+15","predicted_price":100.0}]"#;
    let json = outrank_live::presentation::prediction_histogram(peers, "T+15", Some(110.0)).unwrap();
    assert!(json.contains("\"buckets\""));
}
