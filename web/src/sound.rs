use seqmaster_core::Cue;
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

/// `(frequency Hz, offset s, duration s)` of every tone in a cue.
type Note = (f32, f64, f64);

const fn notes(cue: Cue) -> &'static [Note] {
    match cue {
        Cue::Correct => &[(523.25, 0.0, 0.12), (659.25, 0.1, 0.12), (783.99, 0.2, 0.2)],
        Cue::Wrong => &[(220.0, 0.0, 0.2), (164.81, 0.18, 0.3)],
        Cue::Warning => &[(880.0, 0.0, 0.08)],
        Cue::Timeout => &[(392.0, 0.0, 0.2), (329.63, 0.2, 0.2), (261.63, 0.4, 0.4)],
        Cue::Achievement => &[
            (523.25, 0.0, 0.1),
            (659.25, 0.1, 0.1),
            (783.99, 0.2, 0.1),
            (1046.5, 0.3, 0.3),
        ],
        // visual only
        Cue::Celebrate => &[],
    }
}

/// Synthesized sound cues; silently disabled where WebAudio is unavailable.
#[derive(Debug)]
pub(crate) struct Sound {
    context: Option<AudioContext>,
}

impl Sound {
    pub(crate) fn new() -> Self {
        let context = AudioContext::new()
            .map_err(|err| log::warn!("WebAudio unavailable: {:?}", err))
            .ok();
        Self { context }
    }

    pub(crate) fn play(&self, cue: Cue) {
        let Some(context) = &self.context else {
            return;
        };
        // autoplay policies keep the context suspended until a user gesture
        if let Err(err) = context.resume() {
            log::debug!("could not resume audio: {:?}", err);
        }
        for &note in notes(cue) {
            if let Err(err) = tone(context, note) {
                log::warn!("could not play {:?}: {:?}", cue, err);
                return;
            }
        }
    }
}

fn tone(context: &AudioContext, (frequency, offset, duration): Note) -> Result<(), JsValue> {
    let oscillator = context.create_oscillator()?;
    let gain = context.create_gain()?;
    oscillator.set_type(OscillatorType::Sine);
    oscillator.frequency().set_value(frequency);
    oscillator.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&context.destination())?;

    let start = context.current_time() + offset;
    let end = start + duration;
    gain.gain().set_value_at_time(0.15, start)?;
    gain.gain().exponential_ramp_to_value_at_time(0.001, end)?;
    oscillator.start_with_when(start)?;
    oscillator.stop_with_when(end)?;
    Ok(())
}
