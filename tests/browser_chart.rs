#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::future::sleep;
use outrank_live::application::{LiveChartController, ZoneFlash};
use outrank_live::config::{ApiConfig, ChartConfig};
use outrank_live::domain::chart::{ChartPhase, MarkerContext, PredictionMarker};
use outrank_live::domain::game::Zone;
use outrank_live::infrastructure::http::GameHttpClient;
use outrank_live::presentation::mount_live_game;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

const UNREACHABLE_API: &str = "http://127.0.0.1:9";

fn document() -> web_sys::Document {
    web_sys::window().and_then(|w| w.document()).unwrap()
}

fn chart_host() -> (HtmlElement, HtmlCanvasElement) {
    let doc = document();
    let container: HtmlElement = doc.create_element("div").unwrap().unchecked_into();
    let canvas: HtmlCanvasElement = doc.create_element("canvas").unwrap().unchecked_into();
    container.append_child(&canvas).unwrap();
    (container, canvas)
}

fn game_host(id: &str) -> HtmlElement {
    let doc = document();
    let el: HtmlElement = doc.create_element("div").unwrap().unchecked_into();
    el.set_id(id);
    doc.body().unwrap().append_child(&el).unwrap();
    el
}

async fn wait_until(mut ready: impl FnMut() -> bool) -> bool {
    for _ in 0..60 {
        if ready() {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    ready()
}

#[wasm_bindgen_test(async)]
async fn chart_teardown_twice_releases_everything() {
    let (container, canvas) = chart_host();
    let config = ChartConfig { badge_mode: true, ..ChartConfig::default() };
    let api = GameHttpClient::new(ApiConfig { base_url: UNREACHABLE_API.into() });
    let mut chart =
        LiveChartController::mount(container.clone(), canvas.clone(), "BTC", config, api, None)
            .unwrap();
    chart.set_predictions(
        vec![PredictionMarker { label: "T+15".into(), price: 90_000.0, zone: None }],
        MarkerContext { now_ms: js_sys::Date::now(), kickoff_ms: None, mode: None },
    );
    chart.set_live_price(50_000.0);
    assert!(canvas.width() > 0);

    // История недоступна: график всё равно оживает и рисует бейдж
    assert!(wait_until(|| container.child_element_count() > 1).await);
    assert_eq!(chart.phase(), ChartPhase::Live);

    chart.teardown();
    chart.teardown();
    assert_eq!((canvas.width(), canvas.height()), (0, 0));
    assert_eq!(container.child_element_count(), 1);

    // Nothing repaints after teardown
    sleep(Duration::from_millis(120)).await;
    assert_eq!((canvas.width(), canvas.height()), (0, 0));
    assert_eq!(container.child_element_count(), 1);
}

#[wasm_bindgen_test(async)]
async fn chart_restart_then_drop_releases_the_canvas() {
    let (container, canvas) = chart_host();
    let api = GameHttpClient::new(ApiConfig { base_url: UNREACHABLE_API.into() });
    let mut chart = LiveChartController::mount(
        container,
        canvas.clone(),
        "BTC",
        ChartConfig::default(),
        api,
        None,
    )
    .unwrap();
    chart.restart("ETH", 420.0).unwrap();
    assert_eq!(canvas.height(), 420);
    assert_eq!(chart.chart().borrow().asset(), "ETH");

    drop(chart);
    assert_eq!((canvas.width(), canvas.height()), (0, 0));
}

#[wasm_bindgen_test(async)]
async fn unmount_runs_every_cleanup() {
    let host = game_host("game-unmount");
    let options = format!(r#"{{"asset":"BTC","api":{{"base_url":"{UNREACHABLE_API}"}}}}"#);
    let mut handle = mount_live_game("game-unmount", &options).unwrap();

    assert!(wait_until(|| host.query_selector("canvas").ok().flatten().is_some()).await);
    let canvas: HtmlCanvasElement =
        host.query_selector("canvas").unwrap().unwrap().unchecked_into();
    assert!(wait_until(|| canvas.width() > 0).await);

    handle.unmount();
    assert!(!handle.is_mounted());
    // Контроллер графика снят через on_cleanup, а не просто удалён из DOM
    assert_eq!((canvas.width(), canvas.height()), (0, 0));
    assert_eq!(host.child_element_count(), 0);
    assert!(handle.push_ledger("[]").is_err());

    handle.unmount();
    host.remove();
}

#[wasm_bindgen_test(async)]
async fn mounted_games_keep_their_own_inputs() {
    let host_a = game_host("game-a");
    let host_b = game_host("game-b");
    let options = format!(r#"{{"asset":"BTC","api":{{"base_url":"{UNREACHABLE_API}"}}}}"#);
    let mut a = mount_live_game("game-a", &options).unwrap();
    let mut b = mount_live_game("game-b", &options).unwrap();

    a.push_ledger(r#"[{"id":"e1","reason":"tip","amount":5.0}]"#).unwrap();
    let rows = |host: &HtmlElement| host.query_selector_all("li.event").unwrap().length();
    assert!(wait_until(|| rows(&host_a) == 1).await);
    assert_eq!(rows(&host_b), 0);

    a.set_chart_asset("ETH".into(), 360.0).unwrap();
    a.unmount();
    assert!(a.set_chart_asset("SOL".into(), 360.0).is_err());

    // A later mount starts with a fresh ledger
    let mut c = mount_live_game("game-a", &options).unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(rows(&host_a), 0);

    b.unmount();
    c.unmount();
    host_a.remove();
    host_b.remove();
}

#[wasm_bindgen_test(async)]
async fn zone_flash_clears_itself_unless_cancelled() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let flash = ZoneFlash::new(60, move |z| s.borrow_mut().push(z));

    flash.trigger(Zone::Gold);
    assert!(flash.is_active());
    sleep(Duration::from_millis(150)).await;
    assert_eq!(*seen.borrow(), vec![Some(Zone::Gold), None]);
    assert!(!flash.is_active());

    flash.trigger(Zone::Dead);
    flash.cancel();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(*seen.borrow(), vec![Some(Zone::Gold), None, Some(Zone::Dead)]);
}
