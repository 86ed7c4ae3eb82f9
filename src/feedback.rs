//! Player feedback (haptics and sound)
//!
//! The game signals three intensities and never depends on how they are
//! rendered. On the web they become Web Audio blips plus `navigator.vibrate`.

use crate::settings::Settings;

/// Feedback strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    /// Meteor destroyed
    Light,
    /// Round started
    Medium,
    /// Ship destroyed
    Heavy,
}

/// Receives feedback cues from the game
pub trait FeedbackSink {
    fn light(&mut self);
    fn medium(&mut self);
    fn heavy(&mut self);

    /// Dispatch by intensity
    fn emit(&mut self, intensity: Intensity) {
        match intensity {
            Intensity::Light => self.light(),
            Intensity::Medium => self.medium(),
            Intensity::Heavy => self.heavy(),
        }
    }
}

/// Feedback that goes nowhere
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn light(&mut self) {}
    fn medium(&mut self) {}
    fn heavy(&mut self) {}
}

/// Volume and switches resolved from [`Settings`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackLevels {
    pub volume: f32,
    pub haptics: bool,
}

impl FeedbackLevels {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            volume: settings.effective_volume(),
            haptics: settings.haptics,
        }
    }

    /// Vibration length (ms) for an intensity, 0 when haptics are off
    pub fn vibration_ms(&self, intensity: Intensity) -> u32 {
        if !self.haptics {
            return 0;
        }
        match intensity {
            Intensity::Light => 10,
            Intensity::Medium => 25,
            Intensity::Heavy => 90,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebFeedback;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{FeedbackLevels, FeedbackSink, Intensity};

    /// Web Audio + vibration feedback
    pub struct WebFeedback {
        ctx: Option<AudioContext>,
        levels: FeedbackLevels,
    }

    impl WebFeedback {
        pub fn new(levels: FeedbackLevels) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, levels }
        }

        pub fn set_levels(&mut self, levels: FeedbackLevels) {
            self.levels = levels;
        }

        fn vibrate(&self, intensity: Intensity) {
            let ms = self.levels.vibration_ms(intensity);
            if ms == 0 {
                return;
            }
            if let Some(window) = web_sys::window() {
                let _ = window.navigator().vibrate_with_duration(ms);
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play(&self, intensity: Intensity) {
            let vol = self.levels.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match intensity {
                Intensity::Light => Self::play_hit(ctx, vol),
                Intensity::Medium => Self::play_launch(ctx, vol),
                Intensity::Heavy => Self::play_crash(ctx, vol),
            }
        }

        /// Meteor destroyed - short crunch
        fn play_hit(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 220.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(70.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Round start - rising sweep
        fn play_launch(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 200.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(600.0, t + 0.15)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }

        /// Ship destroyed - descending tones
        fn play_crash(ctx: &AudioContext, vol: f32) {
            for (i, freq) in [400.0, 300.0, 200.0].iter().enumerate() {
                let delay = i as f64 * 0.15;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Sawtooth) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.3).ok();
                }
            }
        }
    }

    impl FeedbackSink for WebFeedback {
        fn light(&mut self) {
            self.play(Intensity::Light);
            self.vibrate(Intensity::Light);
        }

        fn medium(&mut self) {
            self.play(Intensity::Medium);
            self.vibrate(Intensity::Medium);
        }

        fn heavy(&mut self) {
            self.play(Intensity::Heavy);
            self.vibrate(Intensity::Heavy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<Intensity>);

    impl FeedbackSink for Recorder {
        fn light(&mut self) {
            self.0.push(Intensity::Light);
        }
        fn medium(&mut self) {
            self.0.push(Intensity::Medium);
        }
        fn heavy(&mut self) {
            self.0.push(Intensity::Heavy);
        }
    }

    #[test]
    fn test_emit_dispatches() {
        let mut rec = Recorder::default();
        rec.emit(Intensity::Heavy);
        rec.emit(Intensity::Light);
        assert_eq!(rec.0, vec![Intensity::Heavy, Intensity::Light]);
    }

    #[test]
    fn test_levels_follow_settings() {
        let mut settings = Settings::default();
        settings.haptics = false;
        let levels = FeedbackLevels::from_settings(&settings);
        assert_eq!(levels.vibration_ms(Intensity::Heavy), 0);

        settings.haptics = true;
        settings.muted = true;
        let levels = FeedbackLevels::from_settings(&settings);
        assert_eq!(levels.volume, 0.0);
        assert!(levels.vibration_ms(Intensity::Light) < levels.vibration_ms(Intensity::Heavy));
    }
}
