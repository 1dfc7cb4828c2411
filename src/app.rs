use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{AbortHandle, Abortable};
use leptos::html::{Canvas, Div};
use leptos::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::{
    application::{
        GameSession, GameState, GameUpdate, LedgerWatcher, LiveChartController, RevealScheduler,
        ZoneFlash,
    },
    config::{FeedConfig, GameOptions, RevealConfig},
    domain::{
        chart::MarkerContext,
        game::{RaceTrackLayout, StatsSnapshot, TRACK_HEIGHT, TRACK_WIDTH, Zone},
        histogram::{PeerPrediction, PredictionHistogram},
        ledger::LedgerEvent,
        logging::{LogComponent, get_logger},
    },
    infrastructure::{audio::play_zone_cue, http::GameHttpClient},
    time_utils::format_price,
};

const COMPONENT: LogComponent = LogComponent::Presentation("LiveGame");
const FLASH_MS: u32 = 1_200;

/// Входы от хост-страницы; у каждой смонтированной игры свои.
///
/// Created inside the mount's reactive scope, so the signals die with it.
#[derive(Clone, Copy)]
pub struct HostInputs {
    ledger: RwSignal<Option<Vec<LedgerEvent>>>,
    chart_target: RwSignal<Option<(String, f64)>>,
}

impl HostInputs {
    pub fn new() -> Self {
        Self { ledger: create_rw_signal(None), chart_target: create_rw_signal(None) }
    }

    /// Latest ledger page from the host's authenticated poll, newest first.
    pub fn push_ledger(&self, events: Vec<LedgerEvent>) {
        self.ledger.set(Some(events));
    }

    /// Switch the chart to another asset or height; the chart restarts from scratch.
    pub fn retarget_chart(&self, asset: String, height: f64) {
        self.chart_target.set(Some((asset, height)));
    }
}

impl Default for HostInputs {
    fn default() -> Self {
        Self::new()
    }
}

/// 🏁 Корневой компонент живой игры
#[component]
pub fn App(options: GameOptions, inputs: HostInputs) -> impl IntoView {
    view! {
        <style>{STYLES}</style>
        <div class="live-game">
            <LiveGame options=options inputs=inputs />
        </div>
    }
}

#[component]
fn LiveGame(options: GameOptions, inputs: HostInputs) -> impl IntoView {
    let connected = create_rw_signal(false);
    let price = create_rw_signal::<Option<f64>>(None);
    let stats = create_rw_signal::<Option<StatsSnapshot>>(None);
    let race = create_rw_signal::<Option<RaceTrackLayout>>(None);
    let flash = create_rw_signal::<Option<Zone>>(None);
    let zone = create_rw_signal::<Option<Zone>>(None);
    let flasher = ZoneFlash::new(FLASH_MS, move |z| flash.set(z));
    let feed_enabled = options.feed_params().is_some();

    let cue = flasher.clone();
    let on_update: Rc<dyn Fn(&GameState, GameUpdate)> =
        Rc::new(move |state: &GameState, update: GameUpdate| match update {
            GameUpdate::Price(p) => price.set(Some(p)),
            GameUpdate::Leaderboard | GameUpdate::Status(_) => {
                stats.set(state.stats());
                race.set(state.race_layout());
                if zone.get_untracked() != state.zone() {
                    zone.set(state.zone());
                }
            }
            GameUpdate::ZoneChanged(change) => {
                stats.set(state.stats());
                zone.set(Some(change.to));
                play_zone_cue(change.to);
                cue.trigger(change.to);
            }
        });
    let on_connection: Rc<dyn Fn(bool)> = Rc::new(move |up| connected.set(up));

    let feed_config = FeedConfig::from_location().unwrap_or_else(|e| {
        get_logger().warn(COMPONENT, &format!("falling back to default feed config: {e}"));
        FeedConfig::default()
    });
    let game = GameSession::start(
        options.feed_params(),
        Some(options.asset.clone()),
        feed_config,
        on_update,
        on_connection,
    );
    on_cleanup(move || {
        let mut game = game;
        game.teardown();
        flasher.cancel();
    });

    let asset = options.asset.clone();
    let chart_options = options.clone();
    view! {
        <div class="live-game__header">
            <span class="live-game__asset">{asset}</span>
            <Show when=move || feed_enabled && !connected.get()>
                <span class="live-game__reconnecting">"Reconnecting…"</span>
            </Show>
        </div>
        <StatsPanel stats=stats.read_only() flash=flash.read_only() />
        <ChartPanel
            options=chart_options
            price=price.read_only()
            zone=zone.read_only()
            target=inputs.chart_target
        />
        <RaceTrack layout=race.read_only() />
        <HistogramPanel options=options price=price.read_only() />
        <EventsFeed page=inputs.ledger />
    }
}

#[component]
fn StatsPanel(
    stats: ReadSignal<Option<StatsSnapshot>>,
    flash: ReadSignal<Option<Zone>>,
) -> impl IntoView {
    let class = move || match flash.get() {
        Some(zone) => format!("stats stats--flash-{zone}"),
        None => "stats".to_string(),
    };

    view! {
        <div class=class>
            {move || match stats.get() {
                Some(s) => view! {
                    <div class="stat">
                        <span class="stat__value">{format!("#{} / {}", s.rank, s.total)}</span>
                        <span class="stat__label">"Rank"</span>
                    </div>
                    <div class="stat">
                        <span class="stat__value" style=format!("color: {}", s.zone.css_color())>
                            {s.zone.to_string()}
                        </span>
                        <span class="stat__label">"Zone"</span>
                    </div>
                    <div class="stat">
                        <span class="stat__value">{format_price(s.distance)}</span>
                        <span class="stat__label">"Distance"</span>
                    </div>
                    <div class="stat">
                        <span class="stat__value">{s.checkpoint.unwrap_or_else(|| "-".into())}</span>
                        <span class="stat__label">"Checkpoint"</span>
                    </div>
                    <div class="stat">
                        <span class="stat__value">
                            {s.status.map(|st| st.to_string()).unwrap_or_else(|| "-".into())}
                        </span>
                        <span class="stat__label">"Status"</span>
                    </div>
                }
                .into_view(),
                None => view! { <div class="stat stat--empty">"Waiting for leaderboard…"</div> }
                    .into_view(),
            }}
        </div>
    }
}

/// 📈 Canvas графика; контроллер живёт ровно столько, сколько компонент
#[component]
fn ChartPanel(
    options: GameOptions,
    price: ReadSignal<Option<f64>>,
    zone: ReadSignal<Option<Zone>>,
    target: RwSignal<Option<(String, f64)>>,
) -> impl IntoView {
    let container_ref = create_node_ref::<Div>();
    let canvas_ref = create_node_ref::<Canvas>();
    let controller: Rc<RefCell<Option<LiveChartController>>> = Rc::new(RefCell::new(None));
    let (picked, set_picked) = create_signal::<Option<f64>>(None);

    let slot = controller.clone();
    create_effect(move |_| {
        let (Some(container), Some(canvas)) = (container_ref.get(), canvas_ref.get()) else {
            return;
        };
        if slot.borrow().is_some() {
            return;
        }
        let container = container.unchecked_ref::<web_sys::HtmlElement>().clone();
        let canvas = canvas.unchecked_ref::<web_sys::HtmlCanvasElement>().clone();
        let (asset, height) = target
            .get_untracked()
            .unwrap_or_else(|| (options.asset.clone(), options.chart.height));
        let mut config = options.chart.clone();
        config.height = height;

        let on_click: Rc<dyn Fn(f64)> = Rc::new(move |p| set_picked.set(Some(p)));
        match LiveChartController::mount(
            container,
            canvas,
            &asset,
            config,
            GameHttpClient::new(options.api.clone()),
            Some(on_click),
        ) {
            Ok(chart) => {
                chart.set_predictions(
                    options.predictions.clone(),
                    MarkerContext {
                        now_ms: js_sys::Date::now(),
                        kickoff_ms: options.kickoff_ms,
                        mode: options.mode,
                    },
                );
                if let Some(z) = zone.get_untracked() {
                    chart.set_zone(z);
                }
                *slot.borrow_mut() = Some(chart);
            }
            Err(e) => get_logger().error(COMPONENT, &format!("❌ chart mount failed: {e}")),
        }
    });

    let slot = controller.clone();
    create_effect(move |_| {
        if let Some(p) = price.get() {
            if let Some(chart) = slot.borrow().as_ref() {
                chart.set_live_price(p);
            }
        }
    });

    let slot = controller.clone();
    create_effect(move |_| {
        if let Some(z) = zone.get() {
            if let Some(chart) = slot.borrow().as_ref() {
                chart.set_zone(z);
            }
        }
    });

    let slot = controller.clone();
    create_effect(move |_| {
        let Some((asset, height)) = target.get() else {
            return;
        };
        if let Some(chart) = slot.borrow_mut().as_mut() {
            if let Err(e) = chart.restart(&asset, height) {
                get_logger().error(COMPONENT, &format!("❌ chart restart failed: {e}"));
            }
        }
    });

    on_cleanup(move || {
        if let Some(mut chart) = controller.borrow_mut().take() {
            chart.teardown();
        }
    });

    view! {
        <div class="chart" node_ref=container_ref>
            <canvas node_ref=canvas_ref></canvas>
            {move || picked.get().map(|p| view! {
                <div class="chart__picked">{format!("🎯 {}", format_price(p))}</div>
            })}
        </div>
    }
}

#[component]
fn RaceTrack(layout: ReadSignal<Option<RaceTrackLayout>>) -> impl IntoView {
    view! {
        <div class="race">
            {move || match layout.get() {
                None => view! { <p class="race__empty">"No rank history yet"</p> }.into_view(),
                Some(l) => race_svg(&l).into_view(),
            }}
        </div>
    }
}

fn race_svg(l: &RaceTrackLayout) -> impl IntoView {
    let width = l.plot_right - l.plot_left;
    let silver_bottom = l.silver_boundary_y.min(l.plot_bottom);
    let bands = [
        (l.plot_top, l.gold_boundary_y, Zone::Gold),
        (l.gold_boundary_y, silver_bottom, Zone::Silver),
        (silver_bottom, l.plot_bottom, Zone::Dead),
    ]
    .into_iter()
    .map(|(top, bottom, zone)| {
        view! {
            <rect x={l.plot_left} y={top} width={width} height={(bottom - top).max(0.0)}
                fill={zone.css_color()} fill-opacity="0.12" />
        }
    })
    .collect_view();

    let x_labels = l
        .x_labels
        .iter()
        .map(|label| {
            view! {
                <text x={label.position} y={l.plot_bottom + 18.0} class="race__tick" text-anchor="middle">
                    {label.text.clone()}
                </text>
            }
        })
        .collect_view();
    let y_labels = l
        .y_labels
        .iter()
        .map(|label| {
            view! {
                <text x={l.plot_left + 4.0} y={label.position + 4.0} class="race__tick">
                    {label.text.clone()}
                </text>
            }
        })
        .collect_view();
    let (cx, cy) = l.current;

    view! {
        <svg class="race__svg" viewBox=format!("0 0 {TRACK_WIDTH} {TRACK_HEIGHT}")>
            {bands}
            <polyline points={l.polyline()} fill="none" stroke="#4da3ff" stroke-width="2" />
            <circle cx={cx} cy={cy} r="4" fill="#4da3ff" />
            {x_labels}
            {y_labels}
        </svg>
    }
}

/// 📊 Распределение прогнозов соперников по выбранному чекпоинту
#[component]
fn HistogramPanel(options: GameOptions, price: ReadSignal<Option<f64>>) -> impl IntoView {
    let labels = options.interval_labels();
    let selected = create_rw_signal(labels.first().cloned().unwrap_or_default());
    let peers = create_rw_signal(Vec::<PeerPrediction>::new());

    if !options.game_id.is_empty() {
        let api = GameHttpClient::new(options.api.clone());
        let game_id = options.game_id.clone();
        let (abort, registration) = AbortHandle::new_pair();
        let fetch = async move {
            match api.fetch_peer_predictions(&game_id).await {
                Ok(list) => peers.set(list),
                Err(e) => get_logger().warn(COMPONENT, &format!("peer predictions unavailable: {e}")),
            }
        };
        spawn_local(async move {
            let _ = Abortable::new(fetch, registration).await;
        });
        on_cleanup(move || abort.abort());
    }

    let histogram = create_memo(move |_| {
        peers.with(|p| PredictionHistogram::for_interval(p, &selected.get(), price.get()))
    });

    let tabs = labels
        .into_iter()
        .map(|label| {
            let value = label.clone();
            let current = label.clone();
            let class = move || if selected.get() == current { "tab tab--active" } else { "tab" };
            view! { <button class=class on:click=move |_| selected.set(value.clone())>{label}</button> }
        })
        .collect_view();

    let bars = move || {
        let h = histogram.get();
        let max = h.max_count().max(1) as f64;
        let marker = price.get().and_then(|p| h.bucket_of(p));
        h.buckets
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let pct = b.count as f64 / max * 100.0;
                let class = if Some(i) == marker { "bar bar--current" } else { "bar" };
                let title = format!(
                    "{} to {}: {}",
                    format_price(b.lower_bound),
                    format_price(b.upper_bound),
                    b.count
                );
                view! {
                    <div class=class title=title>
                        <div class="bar__fill" style=format!("height: {pct:.1}%")></div>
                        <span class="bar__count">{b.count}</span>
                    </div>
                }
            })
            .collect_view()
    };

    let range = move || {
        histogram.get().display_range.map(|(lo, hi)| {
            view! {
                <div class="histogram__range">
                    <span>{format_price(lo)}</span>
                    <span>{format_price(hi)}</span>
                </div>
            }
        })
    };

    view! {
        <div class="histogram">
            <div class="histogram__tabs">{tabs}</div>
            <Show
                when=move || histogram.with(|h| h.total() > 0)
                fallback=|| view! { <p class="histogram__empty">"No predictions yet"</p> }
            >
                <div class="histogram__bars">{bars}</div>
            </Show>
            {range}
        </div>
    }
}

/// 🧾 Лента леджера; новые записи подсвечиваются по одной
#[component]
fn EventsFeed(page: RwSignal<Option<Vec<LedgerEvent>>>) -> impl IntoView {
    let events = create_rw_signal(Vec::<LedgerEvent>::new());
    let highlighted = create_rw_signal(Vec::<String>::new());
    let scheduler = RevealScheduler::new(RevealConfig::default(), move |ids| highlighted.set(ids));
    let watcher = Rc::new(RefCell::new(LedgerWatcher::new(scheduler)));

    let w = watcher.clone();
    create_effect(move |_| {
        if let Some(latest) = page.get() {
            w.borrow_mut().observe(latest.clone());
            events.set(latest);
        }
    });
    on_cleanup(move || watcher.borrow().scheduler().stop());

    view! {
        <ul class="events">
            <For
                each=move || events.get()
                key=|e: &LedgerEvent| e.id.clone()
                children=move |e: LedgerEvent| {
                    let id = e.id.clone();
                    let class = move || {
                        if highlighted.with(|h| h.contains(&id)) { "event event--reveal" } else { "event" }
                    };
                    let amount_class =
                        if e.is_credit() { "event__amount event__amount--credit" } else { "event__amount" };
                    view! {
                        <li class=class>
                            <span class="event__title">{e.title()}</span>
                            {e.details().map(|d| view! { <span class="event__details">{d}</span> })}
                            <span class=amount_class>{e.amount_text()}</span>
                        </li>
                    }
                }
            />
        </ul>
    }
}

const STYLES: &str = r#"
.live-game {
    font-family: ui-sans-serif, -apple-system, BlinkMacSystemFont, sans-serif;
    background: #11151c;
    color: #d6dbe3;
    padding: 16px;
    display: flex;
    flex-direction: column;
    gap: 12px;
}
.live-game__header { display: flex; align-items: center; gap: 12px; }
.live-game__asset { font-size: 20px; font-weight: 700; }
.live-game__reconnecting { color: #f5c542; font-size: 12px; }
.stats { display: flex; gap: 24px; padding: 8px 12px; border-radius: 8px; transition: background 0.3s; }
.stats--flash-gold { background: rgba(245, 197, 66, 0.18); }
.stats--flash-silver { background: rgba(192, 199, 209, 0.18); }
.stats--flash-dead { background: rgba(224, 82, 90, 0.18); }
.stat { display: flex; flex-direction: column; }
.stat__value { font-size: 18px; font-weight: 600; font-family: ui-monospace, monospace; }
.stat__label { font-size: 11px; color: #7d8794; }
.chart { position: relative; width: 100%; }
.chart canvas { display: block; cursor: crosshair; }
.chart__picked { position: absolute; left: 8px; bottom: 32px; font-size: 12px; }
.race__svg { width: 100%; height: auto; }
.race__tick { font-size: 11px; fill: #7d8794; }
.race__empty, .histogram__empty { color: #7d8794; font-size: 12px; }
.histogram__tabs { display: flex; gap: 4px; margin-bottom: 8px; }
.tab { background: #1c222c; color: #d6dbe3; border: none; padding: 4px 10px; border-radius: 4px; cursor: pointer; }
.tab--active { background: #4da3ff; color: #11151c; }
.histogram__bars { display: flex; align-items: flex-end; gap: 4px; height: 120px; }
.bar { flex: 1; position: relative; height: 100%; display: flex; align-items: flex-end; }
.bar__fill { width: 100%; background: #2f3a4a; border-radius: 2px 2px 0 0; }
.bar--current .bar__fill { background: #4da3ff; }
.bar__count { position: absolute; top: 0; width: 100%; text-align: center; font-size: 10px; }
.histogram__range { display: flex; justify-content: space-between; font-size: 11px; color: #7d8794; }
.events { list-style: none; margin: 0; padding: 0; }
.event { display: flex; gap: 8px; padding: 4px 8px; border-radius: 4px; transition: background 0.4s; }
.event--reveal { background: rgba(77, 163, 255, 0.2); }
.event__details { color: #7d8794; font-size: 12px; }
.event__amount { margin-left: auto; font-family: ui-monospace, monospace; color: #e0525a; }
.event__amount--credit { color: #4caf7a; }
"#;
