//! Keyed asset cache with explicit load completion.
//!
//! Loads are fire-and-forget from the consumer's point of view: the host
//! (or a test) completes them whenever decoding finishes, and consumers poll
//! readiness. A key that never becomes ready degrades the features that
//! wanted it, nothing more.

use std::collections::BTreeMap;

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioBuffer {
    /// Decoded length in seconds.
    pub duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetState {
    Pending,
    Ready(AudioBuffer),
    Failed,
}

#[derive(Debug, Default)]
pub struct AssetCache {
    audio: BTreeMap<String, AssetState>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key as in-flight. Re-registering an existing key is a
    /// no-op; there is no cancellation of loads.
    pub fn request_audio(&mut self, key: &str) {
        self.audio
            .entry(key.to_string())
            .or_insert(AssetState::Pending);
    }

    pub fn complete_audio(&mut self, key: &str, duration: f32) {
        self.audio
            .insert(key.to_string(), AssetState::Ready(AudioBuffer { duration }));
    }

    pub fn fail_audio(&mut self, key: &str) {
        warn!("audio load failed for {key}");
        self.audio.insert(key.to_string(), AssetState::Failed);
    }

    /// Refines the duration of an already-decoded buffer. Audio metadata can
    /// settle after the first decode; subtitle segments rebuild off this.
    pub fn update_audio_duration(&mut self, key: &str, duration: f32) {
        if let Some(state) = self.audio.get_mut(key) {
            if let AssetState::Ready(buffer) = state {
                buffer.duration = duration;
            }
        }
    }

    pub fn audio_state(&self, key: &str) -> AssetState {
        self.audio
            .get(key)
            .copied()
            .unwrap_or(AssetState::Pending)
    }

    pub fn audio_buffer(&self, key: &str) -> Option<AudioBuffer> {
        match self.audio_state(key) {
            AssetState::Ready(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn audio_duration(&self, key: &str) -> Option<f32> {
        self.audio_buffer(key).map(|buffer| buffer.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_reads_as_pending() {
        let cache = AssetCache::new();
        assert_eq!(cache.audio_state("room1"), AssetState::Pending);
        assert!(cache.audio_buffer("room1").is_none());
    }

    #[test]
    fn completion_makes_buffer_available() {
        let mut cache = AssetCache::new();
        cache.request_audio("room1");
        assert!(cache.audio_buffer("room1").is_none());
        cache.complete_audio("room1", 42.5);
        assert_eq!(cache.audio_duration("room1"), Some(42.5));
    }

    #[test]
    fn duration_refinement_updates_ready_buffers_only() {
        let mut cache = AssetCache::new();
        cache.request_audio("room1");
        cache.update_audio_duration("room1", 10.0);
        assert!(cache.audio_buffer("room1").is_none());

        cache.complete_audio("room1", 10.0);
        cache.update_audio_duration("room1", 12.0);
        assert_eq!(cache.audio_duration("room1"), Some(12.0));
    }

    #[test]
    fn failed_load_is_not_ready() {
        let mut cache = AssetCache::new();
        cache.request_audio("room2");
        cache.fail_audio("room2");
        assert_eq!(cache.audio_state("room2"), AssetState::Failed);
        assert!(cache.audio_buffer("room2").is_none());
    }
}
