use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::app::{App, HostInputs};
use crate::config::GameOptions;
use crate::domain::{
    errors::AppError,
    histogram::{PeerPrediction, PredictionHistogram},
    ledger::LedgerEvent,
    logging::{LogComponent, get_logger},
};

/// WASM API для хост-страницы: монтирование игры и проталкивание данных
/// Минимальная логика, только мост к app/application слоям

const COMPONENT: LogComponent = LogComponent::Presentation("WasmApi");

fn to_js(e: AppError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

struct Mounted {
    inputs: HostInputs,
    container: web_sys::HtmlElement,
    // Владелец реактивной области игры: drop запускает все on_cleanup
    scope: Disposer,
}

/// A mounted live game. `unmount` (or dropping the handle) disposes the
/// game's reactive scope, which closes the feed, stops the timers and
/// releases the chart.
#[wasm_bindgen]
pub struct LiveGameHandle {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl LiveGameHandle {
    pub fn unmount(&mut self) {
        if let Some(Mounted { container, scope, .. }) = self.mounted.take() {
            drop(scope);
            container.set_inner_html("");
            get_logger().info(COMPONENT, "🧹 live game unmounted");
        }
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Replace the ledger page shown in this game's events feed
    /// (JSON array, newest first).
    #[wasm_bindgen(js_name = pushLedger)]
    pub fn push_ledger(&self, events_json: &str) -> Result<(), JsValue> {
        let inputs = self.inputs()?;
        let events: Vec<LedgerEvent> =
            serde_json::from_str(events_json).map_err(|e| to_js(AppError::from(e)))?;
        inputs.push_ledger(events);
        Ok(())
    }

    /// Point this game's chart at another asset or height.
    #[wasm_bindgen(js_name = setChartAsset)]
    pub fn set_chart_asset(&self, asset: String, height: f64) -> Result<(), JsValue> {
        self.inputs()?.retarget_chart(asset, height);
        Ok(())
    }
}

impl LiveGameHandle {
    fn inputs(&self) -> Result<HostInputs, JsValue> {
        self.mounted
            .as_ref()
            .map(|m| m.inputs)
            .ok_or_else(|| to_js(AppError::ValidationError("live game is unmounted".into())))
    }
}

impl Drop for LiveGameHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Mount the live game into the element with `container_id`.
/// `options_json` follows [`GameOptions`] (camelCase keys, all optional).
#[wasm_bindgen(js_name = mountLiveGame)]
pub fn mount_live_game(container_id: &str, options_json: &str) -> Result<LiveGameHandle, JsValue> {
    let options = GameOptions::from_json(options_json).map_err(to_js)?;
    let container = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(container_id))
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        .ok_or_else(|| JsValue::from_str(&format!("no element #{container_id}")))?;

    get_logger().info(
        COMPONENT,
        &format!("🚀 mounting live game {} ({})", options.game_id, options.asset),
    );
    let target = container.clone();
    let mount = as_child_of_current_owner(move |options: GameOptions| {
        let inputs = HostInputs::new();
        mount_to(target.clone(), move || view! { <App options=options inputs=inputs /> });
        inputs
    });
    let (inputs, scope) = mount(options);
    Ok(LiveGameHandle { mounted: Some(Mounted { inputs, container, scope }) })
}

/// Bucketed peer predictions for one checkpoint, as JSON.
#[wasm_bindgen(js_name = predictionHistogram)]
pub fn prediction_histogram(
    peers_json: &str,
    interval_label: &str,
    current_price: Option<f64>,
) -> Result<String, JsValue> {
    let peers: Vec<PeerPrediction> =
        serde_json::from_str(peers_json).map_err(|e| to_js(AppError::from(e)))?;
    let histogram = PredictionHistogram::for_interval(&peers, interval_label, current_price);
    serde_json::to_string(&histogram).map_err(|e| to_js(AppError::from(e)))
}
