use outrank_live::config::ChartConfig;
use outrank_live::domain::chart::{
    BadgeEdge, ChartPhase, Color, MarkerContext, PredictionMarker, PriceChart,
};
use outrank_live::domain::game::{GameMode, Zone};
use outrank_live::domain::market_data::PriceSample;

fn live_chart() -> PriceChart {
    let mut chart = PriceChart::new("BTC", ChartConfig::default());
    chart.begin_history_load();
    chart.finish_history_load(Some(vec![
        PriceSample::new(100, 50_000.0),
        PriceSample::new(101, 50_010.0),
    ]));
    chart
}

#[test]
fn nothing_renders_before_history_completes() {
    let mut chart = PriceChart::new("BTC", ChartConfig::default());
    assert_eq!(chart.phase(), ChartPhase::Uninitialized);
    assert!(chart.tick(1_000.0).is_none());

    chart.begin_history_load();
    chart.set_live_price(10.0);
    assert_eq!(chart.phase(), ChartPhase::HistoryLoading);
    assert!(chart.tick(1_000.0).is_none());
}

#[test]
fn history_then_live_tick_extends_the_line() {
    let mut chart = live_chart();
    assert_eq!(chart.phase(), ChartPhase::Live);
    chart.set_live_price(50_020.0);

    let frame = chart.tick(102_400.0).unwrap();
    let last = frame.last_sample.unwrap();
    assert_eq!((last.time, last.price), (102, 50_020.0));
    assert_eq!(frame.line.len(), 3);
    assert!((frame.window.from - (102.4 - 300.0)).abs() < 1e-9);
    assert!((frame.window.to - (102.4 + 60.0)).abs() < 1e-9);

    let viewport = frame.viewport.unwrap();
    assert!(viewport.min_price <= 50_000.0 && viewport.max_price >= 50_020.0);
}

#[test]
fn failed_history_still_goes_live() {
    let mut chart = PriceChart::new("ETH", ChartConfig::default());
    chart.begin_history_load();
    chart.finish_history_load(None);
    assert_eq!(chart.phase(), ChartPhase::Live);

    let frame = chart.tick(5_000.0).unwrap();
    assert!(frame.viewport.is_none());
    assert!(frame.line.is_empty());

    chart.set_live_price(3_000.0);
    let frame = chart.tick(6_000.0).unwrap();
    assert!(frame.viewport.is_some());
}

#[test]
fn far_predictions_are_pinned_to_the_edges() {
    let mut chart = live_chart();
    chart.set_live_price(50_020.0);
    chart.set_predictions(
        vec![
            PredictionMarker { label: "T+30".into(), price: 90_000.0, zone: None },
            PredictionMarker { label: "T+15".into(), price: 50_005.0, zone: None },
            PredictionMarker { label: "T+45".into(), price: 1.0, zone: None },
        ],
        MarkerContext { now_ms: 102_400.0, kickoff_ms: None, mode: Some(GameMode::SixtyMinutes) },
    );
    let frame = chart.tick(102_400.0).unwrap();
    let config = ChartConfig::default();

    let titles: Vec<&str> = frame.markers.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["T+15", "T+30  90,000", "T+45  1"]);
    assert!(!frame.markers[0].is_clamped);
    assert_eq!(frame.markers[1].y, config.top_inset_px);
    assert_eq!(frame.markers[2].y, config.height - config.bottom_inset_px);
    assert!(frame.markers.iter().skip(1).all(|m| !m.axis_label_visible));
}

#[test]
fn restart_returns_to_uninitialized() {
    let mut chart = live_chart();
    chart.apply_wheel(240.0);
    chart.restart("ETH", 420.0);
    assert_eq!(chart.phase(), ChartPhase::Uninitialized);
    assert_eq!(chart.asset(), "ETH");
    assert_eq!(chart.config().height, 420.0);
    assert!(chart.timeline().is_empty());
    assert_eq!(chart.view_state().zoom_level(), 0.0);
}

#[test]
fn clicked_y_maps_back_to_price() {
    let mut chart = live_chart();
    chart.set_live_price(50_020.0);
    chart.tick(102_400.0);
    let y = chart.y_for_price(50_010.0).unwrap();
    assert!((chart.price_at_y(y).unwrap() - 50_010.0).abs() < 1e-6);
}

fn one_prediction(chart: &mut PriceChart, price: f64) {
    chart.set_predictions(
        vec![PredictionMarker { label: "T+15".into(), price, zone: None }],
        MarkerContext { now_ms: 102_400.0, kickoff_ms: None, mode: None },
    );
}

#[test]
fn tracked_zone_recolours_markers_and_badges() {
    let mut chart = PriceChart::new("BTC", ChartConfig { badge_mode: true, ..ChartConfig::default() });
    // Зона пришла раньше истории: применяется, когда маркеры появятся
    chart.set_zone(Zone::Silver);
    chart.begin_history_load();
    chart.finish_history_load(Some(vec![
        PriceSample::new(100, 50_000.0),
        PriceSample::new(101, 50_010.0),
    ]));
    chart.set_live_price(50_020.0);
    chart.set_predictions(
        vec![
            PredictionMarker { label: "T+15".into(), price: 50_005.0, zone: None },
            PredictionMarker { label: "T+30".into(), price: 90_000.0, zone: None },
        ],
        MarkerContext { now_ms: 102_400.0, kickoff_ms: None, mode: None },
    );

    let frame = chart.tick(102_400.0).unwrap();
    assert_eq!(frame.markers[0].color, Color::for_zone(Some(Zone::Silver)).with_alpha(1.0));
    assert_eq!(frame.badges[0].zone, Some(Zone::Silver));

    chart.set_zone(Zone::Gold);
    let frame = chart.tick(102_440.0).unwrap();
    assert_eq!(frame.markers[0].color, Color::for_zone(Some(Zone::Gold)).with_alpha(1.0));
    assert_eq!(frame.badges[0].zone, Some(Zone::Gold));
    assert_eq!(chart.zone(), Some(Zone::Gold));
}

#[test]
fn badge_mode_replaces_the_pinned_line() {
    let mut chart = PriceChart::new("BTC", ChartConfig { badge_mode: true, ..ChartConfig::default() });
    chart.begin_history_load();
    chart.finish_history_load(Some(vec![
        PriceSample::new(100, 50_000.0),
        PriceSample::new(101, 50_010.0),
    ]));
    chart.set_live_price(50_020.0);
    one_prediction(&mut chart, 90_000.0);

    let frame = chart.tick(102_400.0).unwrap();
    assert_eq!(frame.badges.len(), 1);
    assert_eq!(frame.badges[0].edge, BadgeEdge::Top);
    assert_eq!(frame.badges[0].text(), "↑ T+15");
    assert!(frame.markers.is_empty());
    assert!(!chart.markers()[0].is_clamped());
    assert_eq!(chart.markers()[0].title(), "T+15");

    // Back in range: the line returns and the badge goes away
    one_prediction(&mut chart, 50_012.0);
    let frame = chart.tick(102_440.0).unwrap();
    assert!(frame.badges.is_empty());
    assert_eq!(frame.markers.len(), 1);
    assert_eq!(frame.markers[0].title, "T+15");
    assert!(!frame.markers[0].is_clamped);
}
