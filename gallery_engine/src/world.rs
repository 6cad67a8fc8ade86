//! Owned component instances wired together, plus the cross-cutting
//! operations (room entry, jail, restart) that touch several of them.

use std::rc::Rc;

use gallery_scene::{Scene, SceneError};
use glam::Vec3;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assets::AssetCache;
use crate::audio::{AudioChannels, AudioEvent, RecordingAudioSink};
use crate::collision::CollisionRegistry;
use crate::config::ROOM_CONFIGS;
use crate::effects::EffectsPool;
use crate::hazards::{BombField, DrunkState, PoliceChase};
use crate::player::{Player, PointerLock};
use crate::rooms::{content, door_nodes, RoomRegistry, TransitionCtx};
use crate::subtitles::{transcript, SubtitleSynchronizer};
use crate::targeting::{CooldownTable, TargetingSet};
use crate::wand::Wand;

pub struct World {
    pub scene: Scene,
    pub assets: AssetCache,
    pub audio: AudioChannels,
    pub subtitles: SubtitleSynchronizer,
    pub collisions: CollisionRegistry,
    pub targeting: TargetingSet,
    pub cooldowns: CooldownTable,
    pub effects: EffectsPool,
    pub player: Player,
    pub rooms: RoomRegistry,
    pub lock: PointerLock,
    pub wand: Wand,
    pub bombs: BombField,
    pub drunk: DrunkState,
    pub police: PoliceChase,
    pub jailed: bool,
    pub events: Vec<String>,
    pub rng: StdRng,
    audio_sink: RecordingAudioSink,
}

impl World {
    /// Builds the whole gallery: every room's geometry up-front, audio
    /// buffers resolved with durations derived from the transcripts (no real
    /// decoding happens in this build).
    pub fn new(seed: u64) -> Result<Self, SceneError> {
        let mut scene = Scene::new();
        let rooms = RoomRegistry::build(&mut scene, content::standard_rooms())?;

        let mut assets = AssetCache::new();
        for config in ROOM_CONFIGS {
            assets.request_audio(config.audio_key);
            let lines = transcript(config.id);
            let words: usize = lines.iter().map(|l| l.split_whitespace().count()).sum();
            let duration = (lines.len() as f32 * 2.4).max(words as f32 / 2.6);
            assets.complete_audio(config.audio_key, duration);
        }
        assets.request_audio("siren");
        assets.complete_audio("siren", 8.0);

        let audio_sink = RecordingAudioSink::new();
        let audio = AudioChannels::new(Rc::new(audio_sink.clone()));

        Ok(Self {
            scene,
            assets,
            audio,
            subtitles: SubtitleSynchronizer::new(),
            collisions: CollisionRegistry::new(),
            targeting: TargetingSet::new(),
            cooldowns: CooldownTable::new(),
            effects: EffectsPool::new(),
            player: Player::new(Vec3::new(0.0, crate::config::EYE_HEIGHT, 8.0)),
            rooms,
            lock: PointerLock::new(),
            wand: Wand::new(),
            bombs: BombField::new(),
            drunk: DrunkState::new(),
            police: PoliceChase::new(),
            jailed: false,
            events: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            audio_sink,
        })
    }

    pub fn log_event(&mut self, event: String) {
        self.events.push(event);
    }

    pub fn audio_events(&self) -> Vec<AudioEvent> {
        self.audio_sink.events()
    }

    /// Room transition plus the pieces the registry does not own: narration
    /// stays paused until pointer lock exists, and an active pursuer follows
    /// through the door.
    pub fn enter_room(&mut self, index: usize, now: f64) -> bool {
        let mut ctx = TransitionCtx {
            scene: &mut self.scene,
            player: &mut self.player,
            collisions: &mut self.collisions,
            audio: &mut self.audio,
            subtitles: &mut self.subtitles,
            targeting: &mut self.targeting,
            assets: &self.assets,
            events: &mut self.events,
            now,
        };
        if !self.rooms.enter_room(index, &mut ctx) {
            return false;
        }
        if !self.lock.is_locked() {
            self.audio.pause(now);
        }
        if self.police.is_active() {
            if let Some(root) = self.rooms.current_root() {
                let doors = door_nodes(&self.scene, root);
                self.police.reposition(
                    &mut self.scene,
                    &doors,
                    self.player.position,
                    self.player.camera_forward(),
                );
            }
        }
        true
    }

    /// Capture or blast outcome: the run freezes behind the jail overlay and
    /// pointer lock is released.
    pub fn jail(&mut self, now: f64) {
        if self.jailed {
            return;
        }
        self.jailed = true;
        self.lock.released();
        self.audio.pause(now);
        self.audio.stop_effect();
        self.police.despawn(&mut self.scene);
        info!("jailed at t={now:.2}");
        self.log_event("player.jailed".to_string());
    }

    /// Clears every hazard, returns to the first room, and relocks.
    pub fn restart(&mut self, now: f64) {
        self.jailed = false;
        self.drunk.clear();
        self.bombs.clear(&mut self.scene);
        self.effects.clear(&mut self.scene);
        self.police.despawn(&mut self.scene);
        self.audio.stop_effect();
        self.rooms.reset_current();
        self.log_event("session.restart".to_string());
        self.enter_room(0, now);
        if self.lock.request(now) {
            self.lock.acquired(now);
            self.audio.resume(now);
        }
    }
}
