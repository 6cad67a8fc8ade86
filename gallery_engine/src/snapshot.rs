//! Per-frame state submitted to the render boundary. Rendering itself lives
//! on the other side of [`RenderSink`]; the engine only hands over data.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub time: f64,
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub room_index: Option<usize>,
    pub room_label: Option<String>,
    pub active_subtitle: Option<String>,
    /// Target room of the nearest in-range door, when one is close enough to
    /// show an interaction prompt.
    pub door_prompt: Option<usize>,
    pub view_overlay: bool,
    pub pointer_locked: bool,
    pub jailed: bool,
    pub drunk_intensity: f32,
    pub police_active: bool,
    pub effect_count: usize,
}

pub trait RenderSink {
    fn submit(&self, snapshot: &FrameSnapshot);
}

/// Sink that keeps every snapshot, for headless runs and tests.
#[derive(Clone, Default)]
pub struct RecordingRenderSink {
    frames: Rc<RefCell<Vec<FrameSnapshot>>>,
}

impl RecordingRenderSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<FrameSnapshot> {
        self.frames.borrow().clone()
    }

    pub fn last(&self) -> Option<FrameSnapshot> {
        self.frames.borrow().last().cloned()
    }
}

impl RenderSink for RecordingRenderSink {
    fn submit(&self, snapshot: &FrameSnapshot) {
        self.frames.borrow_mut().push(snapshot.clone());
    }
}
