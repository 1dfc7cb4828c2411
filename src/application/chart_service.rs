use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{AbortHandle, Abortable};
use gloo::events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Interval;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use crate::config::ChartConfig;
use crate::domain::{
    chart::{BadgeRegistry, ChartPhase, Frame, MarkerContext, PredictionMarker, PriceChart},
    game::Zone,
    errors::{AppError, RenderingResult},
    logging::{LogComponent, get_logger},
};
use crate::infrastructure::{
    http::GameHttpClient,
    rendering::{CanvasRenderer, DomBadgeSurface, ResizeWatch},
};

const COMPONENT: LogComponent = LogComponent::Application("LiveChart");

/// Всё, что привязано к DOM: canvas, оверлей бейджей и их реестр
struct ChartSurface {
    renderer: CanvasRenderer,
    overlay: DomBadgeSurface,
    badges: BadgeRegistry<HtmlElement>,
}

impl ChartSurface {
    fn paint(&mut self, frame: &Frame, badge_mode: bool) {
        if let Err(e) = self.renderer.paint(frame) {
            get_logger().warn(COMPONENT, &format!("paint failed: {e}"));
        }
        if badge_mode {
            self.badges.reconcile(&mut self.overlay, frame.badges.clone());
        } else if !self.badges.is_empty() {
            self.badges.clear(&mut self.overlay);
        }
    }

    fn release(&mut self) {
        self.badges.clear(&mut self.overlay);
        self.renderer.release();
    }
}

/// Живой график цены: история через REST, затем тик рендера каждые `tick_ms`.
///
/// Controller owns every browser handle it creates and releases all of them
/// in [`teardown`](Self::teardown), which also runs on drop.
pub struct LiveChartController {
    chart: Rc<RefCell<PriceChart>>,
    surface: Rc<RefCell<Option<ChartSurface>>>,
    interval: Rc<RefCell<Option<Interval>>>,
    resize_watch: Option<ResizeWatch>,
    input_listeners: Vec<EventListener>,
    history_task: Option<AbortHandle>,
    api: GameHttpClient,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    on_price_click: Option<Rc<dyn Fn(f64)>>,
}

impl LiveChartController {
    pub fn mount(
        container: HtmlElement,
        canvas: HtmlCanvasElement,
        asset: &str,
        mut config: ChartConfig,
        api: GameHttpClient,
        on_price_click: Option<Rc<dyn Fn(f64)>>,
    ) -> RenderingResult<Self> {
        let width = container.client_width();
        if width > 0 {
            config.width = width as f64;
        }
        let mut controller = Self {
            chart: Rc::new(RefCell::new(PriceChart::new(asset, config))),
            surface: Rc::new(RefCell::new(None)),
            interval: Rc::new(RefCell::new(None)),
            resize_watch: None,
            input_listeners: Vec::new(),
            history_task: None,
            api,
            container,
            canvas,
            on_price_click,
        };
        controller.start()?;
        Ok(controller)
    }

    fn start(&mut self) -> RenderingResult<()> {
        let (width, height) = {
            let chart = self.chart.borrow();
            (chart.config().width, chart.config().height)
        };
        let renderer = CanvasRenderer::new(self.canvas.clone(), width, height)?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| AppError::RenderingError("document unavailable".into()))?;
        *self.surface.borrow_mut() = Some(ChartSurface {
            renderer,
            overlay: DomBadgeSurface::new(document, self.container.clone()),
            badges: BadgeRegistry::new(),
        });

        self.attach_listeners();
        self.load_history();
        Ok(())
    }

    fn load_history(&mut self) {
        let asset = {
            let mut chart = self.chart.borrow_mut();
            chart.begin_history_load();
            chart.asset().to_string()
        };
        get_logger().info(COMPONENT, &format!("📈 loading history for {asset}"));

        let (handle, registration) = AbortHandle::new_pair();
        self.history_task = Some(handle);

        let api = self.api.clone();
        let chart = self.chart.clone();
        let surface = self.surface.clone();
        let interval = self.interval.clone();
        let task = async move {
            let history = match api.fetch_price_history(&asset).await {
                Ok(samples) => Some(samples),
                Err(e) => {
                    // Без истории график всё равно стартует и копит живые тики
                    crate::log_warn!(COMPONENT, "history unavailable: {e}");
                    None
                }
            };
            chart.borrow_mut().finish_history_load(history);
            start_render_timer(&chart, &surface, &interval);
        };
        spawn_local(async move {
            let _ = Abortable::new(task, registration).await;
        });
    }

    fn attach_listeners(&mut self) {
        let chart = self.chart.clone();
        let surface = self.surface.clone();
        let container = self.container.clone();
        let watch = ResizeWatch::observe(&self.container, move || {
            let width = container.client_width() as f64;
            if width <= 0.0 {
                return;
            }
            let height = {
                let mut chart = chart.borrow_mut();
                chart.resize(width);
                chart.config().height
            };
            if let Some(surface) = surface.borrow_mut().as_mut() {
                surface.renderer.resize(width, height);
            }
        });
        match watch {
            Ok(watch) => self.resize_watch = Some(watch),
            // Без наблюдателя график просто остаётся начальной ширины
            Err(e) => get_logger().warn(COMPONENT, &format!("resize tracking off: {e}")),
        }

        let chart = self.chart.clone();
        let wheel = EventListener::new_with_options(
            &self.container,
            "wheel",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if !chart.borrow().config().enable_y_zoom {
                    return;
                }
                let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                chart.borrow_mut().apply_wheel(wheel.delta_y());
            },
        );
        self.input_listeners.push(wheel);

        if let Some(callback) = self.on_price_click.clone() {
            let chart = self.chart.clone();
            let click = EventListener::new(&self.canvas, "click", move |event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let price = chart.borrow().price_at_y(mouse.offset_y() as f64);
                if let Some(price) = price {
                    callback(price);
                }
            });
            self.input_listeners.push(click);
        }
    }

    pub fn set_live_price(&self, price: f64) {
        self.chart.borrow_mut().set_live_price(price);
    }

    pub fn set_predictions(&self, predictions: Vec<PredictionMarker>, context: MarkerContext) {
        self.chart.borrow_mut().set_predictions(predictions, context);
    }

    pub fn set_zone(&self, zone: Zone) {
        self.chart.borrow_mut().set_zone(zone);
    }

    pub fn phase(&self) -> ChartPhase {
        self.chart.borrow().phase()
    }

    pub fn chart(&self) -> Rc<RefCell<PriceChart>> {
        self.chart.clone()
    }

    /// Asset or height change: full teardown, then start over from history.
    pub fn restart(&mut self, asset: &str, height: f64) -> RenderingResult<()> {
        get_logger().info(COMPONENT, &format!("🔄 restarting chart for {asset}"));
        self.teardown();
        self.chart.borrow_mut().restart(asset, height);
        self.start()
    }

    /// Stop the render timer, detach resize observation, drop the badges,
    /// release the canvas and forget every handle. Idempotent.
    pub fn teardown(&mut self) {
        if let Some(task) = self.history_task.take() {
            task.abort();
        }
        if let Some(timer) = self.interval.borrow_mut().take() {
            drop(timer);
        }
        self.resize_watch = None;
        self.input_listeners.clear();
        if let Some(mut surface) = self.surface.borrow_mut().take() {
            surface.release();
            get_logger().debug(COMPONENT, "chart surface released");
        }
    }
}

impl Drop for LiveChartController {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn start_render_timer(
    chart: &Rc<RefCell<PriceChart>>,
    surface: &Rc<RefCell<Option<ChartSurface>>>,
    slot: &Rc<RefCell<Option<Interval>>>,
) {
    // Поверхность уже снята: рендерить некуда
    if surface.borrow().is_none() {
        return;
    }
    let tick_ms = chart.borrow().config().tick_ms;
    let chart = chart.clone();
    let surface = surface.clone();
    let timer = Interval::new(tick_ms, move || {
        let (frame, badge_mode) = {
            let mut chart = chart.borrow_mut();
            let badge_mode = chart.config().badge_mode;
            (chart.tick(js_sys::Date::now()), badge_mode)
        };
        if let (Some(frame), Some(surface)) = (frame, surface.borrow_mut().as_mut()) {
            surface.paint(&frame, badge_mode);
        }
    });
    *slot.borrow_mut() = Some(timer);
    get_logger().info(COMPONENT, &format!("✅ render timer started ({tick_ms} ms)"));
}
