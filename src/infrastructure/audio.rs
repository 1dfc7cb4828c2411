use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

use crate::domain::game::Zone;
use crate::domain::logging::{LogComponent, get_logger};

const CUE_SECONDS: f64 = 0.3;

/// Short sine blip whose pitch encodes the zone just entered.
pub fn play_zone_cue(zone: Zone) {
    if let Err(e) = try_play(zone.cue_frequency_hz()) {
        get_logger().debug(
            LogComponent::Infrastructure("Audio"),
            &format!("zone cue unavailable: {e:?}"),
        );
    }
}

fn try_play(frequency: f32) -> Result<(), JsValue> {
    let ctx = AudioContext::new()?;
    let osc = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;
    osc.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    osc.set_type(OscillatorType::Sine);
    osc.frequency().set_value(frequency);
    let now = ctx.current_time();
    gain.gain().set_value_at_time(0.1, now)?;
    gain.gain().exponential_ramp_to_value_at_time(0.001, now + CUE_SECONDS)?;
    osc.start()?;
    osc.stop_with_when(now + CUE_SECONDS)?;
    Ok(())
}
