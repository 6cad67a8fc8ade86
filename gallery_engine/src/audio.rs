//! Narration and effect audio channels.
//!
//! Playback position is tracked from the frame clock, not queried back from
//! the underlying audio primitive. The host may suspend the real audio clock
//! across pointer-lock transitions; keeping the arithmetic here means
//! pause/resume cannot drift.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use serde::Serialize;

use crate::assets::AssetCache;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioEvent {
    NarrationPlay { key: String, offset: f64 },
    NarrationStop { key: String },
    NarrationMissing { key: String },
    EffectPlay { key: String, looping: bool },
    EffectStop { key: String },
    EffectFade { key: String, seconds: f64 },
}

/// Boundary to whatever actually produces sound. The engine only issues
/// commands; it never reads playback state back.
pub trait AudioSink {
    fn handle(&self, event: &AudioEvent);
}

/// Sink that records every command, for headless runs and tests.
#[derive(Clone, Default)]
pub struct RecordingAudioSink {
    events: Rc<RefCell<Vec<AudioEvent>>>,
}

impl RecordingAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AudioEvent> {
        self.events.borrow().clone()
    }
}

impl AudioSink for RecordingAudioSink {
    fn handle(&self, event: &AudioEvent) {
        debug!("audio sink: {event:?}");
        self.events.borrow_mut().push(event.clone());
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NarrationState {
    Idle,
    Playing {
        key: String,
        started_at: f64,
        duration: f32,
    },
    Paused {
        key: String,
        offset: f64,
        duration: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct EffectState {
    key: String,
    fade_ends_at: Option<f64>,
    fade_started_at: f64,
}

/// One narration slot and one independent one-shot effect slot.
pub struct AudioChannels {
    sink: Rc<dyn AudioSink>,
    narration: NarrationState,
    effect: Option<EffectState>,
}

impl AudioChannels {
    pub fn new(sink: Rc<dyn AudioSink>) -> Self {
        Self {
            sink,
            narration: NarrationState::Idle,
            effect: None,
        }
    }

    /// Starts narration for `key`, cutting any current narration without a
    /// cross-fade. A buffer that has not finished loading leaves the slot
    /// idle; a later transition simply tries again.
    pub fn play(&mut self, key: &str, assets: &AssetCache, now: f64) {
        if let NarrationState::Playing { key: current, .. } = &self.narration {
            self.sink.handle(&AudioEvent::NarrationStop {
                key: current.clone(),
            });
            self.narration = NarrationState::Idle;
        }

        match assets.audio_buffer(key) {
            Some(buffer) => {
                self.sink.handle(&AudioEvent::NarrationPlay {
                    key: key.to_string(),
                    offset: 0.0,
                });
                self.narration = NarrationState::Playing {
                    key: key.to_string(),
                    started_at: now,
                    duration: buffer.duration,
                };
            }
            None => {
                info!("no audio buffer for {key} yet; narration stays idle");
                self.sink.handle(&AudioEvent::NarrationMissing {
                    key: key.to_string(),
                });
                self.narration = NarrationState::Idle;
            }
        }
    }

    /// Valid only while playing; anything else is ignored.
    pub fn pause(&mut self, now: f64) {
        if let NarrationState::Playing { key, duration, .. } = self.narration.clone() {
            let offset = self.position(now);
            self.sink
                .handle(&AudioEvent::NarrationStop { key: key.clone() });
            self.narration = NarrationState::Paused {
                key,
                offset,
                duration,
            };
        }
    }

    /// Valid only while paused; restarts playback where `pause` left it.
    pub fn resume(&mut self, now: f64) {
        if let NarrationState::Paused {
            key,
            offset,
            duration,
        } = self.narration.clone()
        {
            self.sink.handle(&AudioEvent::NarrationPlay {
                key: key.clone(),
                offset,
            });
            self.narration = NarrationState::Playing {
                key,
                started_at: now - offset,
                duration,
            };
        }
    }

    pub fn stop(&mut self) {
        match &self.narration {
            NarrationState::Playing { key, .. } | NarrationState::Paused { key, .. } => {
                self.sink
                    .handle(&AudioEvent::NarrationStop { key: key.clone() });
            }
            NarrationState::Idle => {}
        }
        self.narration = NarrationState::Idle;
    }

    /// Current narration offset in seconds, clamped to the buffer length.
    pub fn position(&self, now: f64) -> f64 {
        match &self.narration {
            NarrationState::Idle => 0.0,
            NarrationState::Paused {
                offset, duration, ..
            } => offset.clamp(0.0, f64::from(*duration)),
            NarrationState::Playing {
                started_at,
                duration,
                ..
            } => (now - started_at).clamp(0.0, f64::from(*duration)),
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.narration, NarrationState::Playing { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.narration, NarrationState::Paused { .. })
    }

    pub fn current_key(&self) -> Option<&str> {
        match &self.narration {
            NarrationState::Playing { key, .. } | NarrationState::Paused { key, .. } => {
                Some(key.as_str())
            }
            NarrationState::Idle => None,
        }
    }

    /// One-shot effect slot (siren, sting). No pause/resume.
    pub fn play_effect(&mut self, key: &str, looping: bool, now: f64) {
        if self.effect.is_some() {
            self.stop_effect();
        }
        self.sink.handle(&AudioEvent::EffectPlay {
            key: key.to_string(),
            looping,
        });
        self.effect = Some(EffectState {
            key: key.to_string(),
            fade_ends_at: None,
            fade_started_at: now,
        });
    }

    pub fn stop_effect(&mut self) {
        if let Some(effect) = self.effect.take() {
            self.sink
                .handle(&AudioEvent::EffectStop { key: effect.key });
        }
    }

    /// Schedules a linear fade to silence, ending `seconds` from now. The
    /// slot stops itself once the fade completes.
    pub fn fade_effect(&mut self, seconds: f64, now: f64) {
        if let Some(effect) = self.effect.as_mut() {
            effect.fade_started_at = now;
            effect.fade_ends_at = Some(now + seconds.max(0.0));
            self.sink.handle(&AudioEvent::EffectFade {
                key: effect.key.clone(),
                seconds,
            });
        }
    }

    /// Linear gain of the effect slot, 1.0 outside any fade window.
    pub fn effect_gain(&self, now: f64) -> f32 {
        match &self.effect {
            None => 0.0,
            Some(EffectState {
                fade_ends_at: None, ..
            }) => 1.0,
            Some(EffectState {
                fade_ends_at: Some(end),
                fade_started_at,
                ..
            }) => {
                let span = (end - fade_started_at).max(f64::EPSILON);
                ((end - now) / span).clamp(0.0, 1.0) as f32
            }
        }
    }

    pub fn effect_active(&self) -> bool {
        self.effect.is_some()
    }

    /// Advances the fade schedule; call once per frame.
    pub fn tick(&mut self, now: f64) {
        let expired = matches!(
            &self.effect,
            Some(EffectState {
                fade_ends_at: Some(end),
                ..
            }) if now >= *end
        );
        if expired {
            self.stop_effect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_assets() -> AssetCache {
        let mut assets = AssetCache::new();
        assets.complete_audio("room1", 30.0);
        assets.complete_audio("siren", 12.0);
        assets
    }

    fn channels() -> (AudioChannels, RecordingAudioSink) {
        let sink = RecordingAudioSink::new();
        let channels = AudioChannels::new(Rc::new(sink.clone()));
        (channels, sink)
    }

    #[test]
    fn play_with_missing_buffer_stays_idle() {
        let (mut channels, sink) = channels();
        let assets = AssetCache::new();
        channels.play("room1", &assets, 0.0);
        assert!(!channels.is_playing());
        assert_eq!(channels.position(5.0), 0.0);
        assert_eq!(
            sink.events(),
            vec![AudioEvent::NarrationMissing {
                key: "room1".into()
            }]
        );
    }

    #[test]
    fn pause_then_resume_preserves_position() {
        let (mut channels, _sink) = channels();
        let assets = ready_assets();
        channels.play("room1", &assets, 10.0);
        assert!((channels.position(14.0) - 4.0).abs() < 1e-9);

        channels.pause(14.0);
        // Paused time must not advance the offset.
        assert!((channels.position(99.0) - 4.0).abs() < 1e-9);

        channels.resume(20.0);
        assert!(channels.is_playing());
        assert!((channels.position(21.5) - 5.5).abs() < 1e-9);
    }

    #[test]
    fn position_clamps_to_duration() {
        let (mut channels, _sink) = channels();
        let assets = ready_assets();
        channels.play("room1", &assets, 0.0);
        assert_eq!(channels.position(500.0), 30.0);
    }

    #[test]
    fn replay_cuts_current_narration() {
        let (mut channels, sink) = channels();
        let mut assets = ready_assets();
        assets.complete_audio("room2", 20.0);

        channels.play("room1", &assets, 0.0);
        channels.play("room2", &assets, 3.0);

        let events = sink.events();
        assert_eq!(
            events,
            vec![
                AudioEvent::NarrationPlay {
                    key: "room1".into(),
                    offset: 0.0
                },
                AudioEvent::NarrationStop {
                    key: "room1".into()
                },
                AudioEvent::NarrationPlay {
                    key: "room2".into(),
                    offset: 0.0
                },
            ]
        );
        assert_eq!(channels.current_key(), Some("room2"));
    }

    #[test]
    fn pause_from_idle_is_ignored() {
        let (mut channels, sink) = channels();
        channels.pause(1.0);
        channels.resume(2.0);
        assert!(sink.events().is_empty());
        assert!(!channels.is_playing());
    }

    #[test]
    fn effect_fade_runs_to_silence_and_stops() {
        let (mut channels, sink) = channels();
        channels.play_effect("siren", true, 0.0);
        assert_eq!(channels.effect_gain(0.0), 1.0);

        channels.fade_effect(2.0, 10.0);
        assert!((channels.effect_gain(11.0) - 0.5).abs() < 1e-6);

        channels.tick(11.0);
        assert!(channels.effect_active());
        channels.tick(12.0);
        assert!(!channels.effect_active());
        assert_eq!(channels.effect_gain(12.5), 0.0);

        let kinds: Vec<_> = sink.events();
        assert!(matches!(kinds.last(), Some(AudioEvent::EffectStop { .. })));
    }
}
