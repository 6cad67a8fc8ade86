//! The six gallery rooms. All geometry is built once at startup; rooms are
//! spaced 200 units apart on z so even invisible neighbours never overlap in
//! world space.

use gallery_scene::{Interactable, NodeId, Scene, SceneError};
use glam::Vec3;

use crate::config::{RoomConfig, EYE_HEIGHT, ROOM_CONFIGS};
use crate::rooms::{RoomBounds, RoomSpec};

const ROOM_SPACING: f32 = 200.0;
const ROOM_HALF_WIDTH: f32 = 10.0;
const ROOM_HALF_DEPTH: f32 = 10.0;
const WALL_HEIGHT: f32 = 4.0;

pub fn standard_rooms() -> Vec<Box<dyn RoomSpec>> {
    (0..ROOM_CONFIGS.len())
        .map(|index| Box::new(GalleryRoom::new(index)) as Box<dyn RoomSpec>)
        .collect()
}

pub struct GalleryRoom {
    index: usize,
    center: Vec3,
    overlay: Option<NodeId>,
    shadow_figure: Option<NodeId>,
}

impl GalleryRoom {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            center: Vec3::new(0.0, 0.0, -(index as f32) * ROOM_SPACING),
            overlay: None,
            shadow_figure: None,
        }
    }

    fn build_shell(&self, scene: &mut Scene, root: NodeId) -> Result<(), SceneError> {
        let floor = scene.add_mesh(
            "floor",
            Some(root),
            Vec3::new(ROOM_HALF_WIDTH, 0.1, ROOM_HALF_DEPTH),
        )?;
        scene.set_position(floor, Vec3::new(0.0, -0.1, 0.0))?;

        let half_wall = WALL_HEIGHT * 0.5;
        let back = scene.add_mesh(
            "wall_back",
            Some(root),
            Vec3::new(ROOM_HALF_WIDTH, half_wall, 0.2),
        )?;
        scene.set_position(back, Vec3::new(0.0, half_wall, -ROOM_HALF_DEPTH))?;
        let front = scene.add_mesh(
            "wall_front",
            Some(root),
            Vec3::new(ROOM_HALF_WIDTH, half_wall, 0.2),
        )?;
        scene.set_position(front, Vec3::new(0.0, half_wall, ROOM_HALF_DEPTH))?;
        let left = scene.add_mesh(
            "wall_left",
            Some(root),
            Vec3::new(0.2, half_wall, ROOM_HALF_DEPTH),
        )?;
        scene.set_position(left, Vec3::new(-ROOM_HALF_WIDTH, half_wall, 0.0))?;
        let right = scene.add_mesh(
            "wall_right",
            Some(root),
            Vec3::new(0.2, half_wall, ROOM_HALF_DEPTH),
        )?;
        scene.set_position(right, Vec3::new(ROOM_HALF_WIDTH, half_wall, 0.0))?;
        Ok(())
    }

    fn build_doors(&self, scene: &mut Scene, root: NodeId) -> Result<(), SceneError> {
        if self.index + 1 < ROOM_CONFIGS.len() {
            let door = scene.add_mesh("door_forward", Some(root), Vec3::new(0.7, 1.1, 0.1))?;
            scene.set_position(door, Vec3::new(4.0, 1.1, -ROOM_HALF_DEPTH + 0.3))?;
            scene.set_tag(
                door,
                Interactable::Door {
                    target_room: self.index + 1,
                },
            )?;
        }
        if self.index > 0 {
            let door = scene.add_mesh("door_back", Some(root), Vec3::new(0.7, 1.1, 0.1))?;
            scene.set_position(door, Vec3::new(-4.0, 1.1, ROOM_HALF_DEPTH - 0.3))?;
            scene.set_tag(
                door,
                Interactable::Door {
                    target_room: self.index - 1,
                },
            )?;
        }
        Ok(())
    }

    fn build_exhibits(&mut self, scene: &mut Scene, root: NodeId) -> Result<(), SceneError> {
        // Wall panels carrying the narration text, one per transcript line.
        let lines = crate::subtitles::transcript(self.config().id).len().max(1);
        for panel in 0..lines.min(4) {
            let x = -6.0 + panel as f32 * 4.0;
            let node = scene.add_mesh("panel", Some(root), Vec3::new(1.6, 1.0, 0.05))?;
            scene.set_position(node, Vec3::new(x, 2.2, -ROOM_HALF_DEPTH + 0.4))?;
            scene.set_tag(node, Interactable::Decor)?;
        }

        match self.index {
            // Microscope pedestal with the auxiliary view trigger.
            2 => {
                let pedestal = scene.add_mesh("pedestal", Some(root), Vec3::new(0.5, 0.6, 0.5))?;
                scene.set_position(pedestal, Vec3::new(0.0, 0.6, -4.0))?;

                let button = scene.add_mesh("view_button", Some(root), Vec3::new(0.3, 0.15, 0.05))?;
                scene.set_position(button, Vec3::new(0.0, 1.4, -4.0))?;
                scene.set_tag(button, Interactable::ViewButton)?;

                let overlay = scene.add_mesh(
                    "plankton_view",
                    Some(root),
                    Vec3::new(2.4, 1.6, 0.02),
                )?;
                scene.set_position(overlay, Vec3::new(0.0, 2.4, -6.0))?;
                scene.set_visible(overlay, false)?;
                self.overlay = Some(overlay);
            }
            // Code-block pillars, one per refactor stage.
            3 => {
                for slot in 0..3u8 {
                    let pillar =
                        scene.add_mesh("code_block", Some(root), Vec3::new(0.4, 0.9, 0.4))?;
                    scene.set_position(
                        pillar,
                        Vec3::new(-3.0 + f32::from(slot) * 3.0, 0.9, -2.0),
                    )?;
                    scene.set_tag(pillar, Interactable::CodeBlock { slot })?;
                }
            }
            // Prototype tables from the hackathon iterations.
            4 => {
                for table in 0..4 {
                    let node = scene.add_mesh("table", Some(root), Vec3::new(0.9, 0.45, 0.6))?;
                    scene.set_position(
                        node,
                        Vec3::new(-6.0 + table as f32 * 4.0, 0.45, 2.0),
                    )?;
                }
            }
            // The slowly pacing silhouette.
            5 => {
                let figure =
                    scene.add_mesh("shadow_figure", Some(root), Vec3::new(0.4, 0.9, 0.2))?;
                scene.set_position(figure, Vec3::new(0.0, 0.9, -5.0))?;
                scene.set_tag(figure, Interactable::Decor)?;
                self.shadow_figure = Some(figure);
            }
            _ => {
                let plinth = scene.add_mesh("plinth", Some(root), Vec3::new(0.5, 0.5, 0.5))?;
                scene.set_position(plinth, Vec3::new(5.0, 0.5, 0.0))?;
            }
        }
        Ok(())
    }
}

impl RoomSpec for GalleryRoom {
    fn config(&self) -> &'static RoomConfig {
        &ROOM_CONFIGS[self.index]
    }

    fn spawn(&self) -> Vec3 {
        self.center + Vec3::new(0.0, EYE_HEIGHT, 8.0)
    }

    fn bounds(&self) -> RoomBounds {
        RoomBounds::centered(self.center, ROOM_HALF_WIDTH, ROOM_HALF_DEPTH)
    }

    fn build(&mut self, scene: &mut Scene) -> Result<NodeId, SceneError> {
        let root = scene.add_group(self.config().id, None)?;
        scene.set_position(root, self.center)?;
        self.build_shell(scene, root)?;
        self.build_doors(scene, root)?;
        self.build_exhibits(scene, root)?;
        Ok(root)
    }

    fn update(
        &mut self,
        scene: &mut Scene,
        _root: NodeId,
        time: f64,
        _dt: f32,
    ) -> Result<(), SceneError> {
        if let Some(figure) = self.shadow_figure {
            let angle = (time * 0.3) as f32;
            scene.set_position(
                figure,
                Vec3::new(angle.sin() * 4.0, 0.9, -5.0 + angle.cos() * 2.0),
            )?;
            scene.set_yaw(figure, angle)?;
        }
        Ok(())
    }

    fn overlay_node(&self) -> Option<NodeId> {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built_rooms() -> (Scene, Vec<(Box<dyn RoomSpec>, NodeId)>) {
        let mut scene = Scene::new();
        let mut out = Vec::new();
        for mut spec in standard_rooms() {
            let root = spec.build(&mut scene).unwrap();
            out.push((spec, root));
        }
        (scene, out)
    }

    #[test]
    fn rooms_do_not_overlap_in_world_space() {
        let (scene, rooms) = built_rooms();
        let boxes: Vec<_> = rooms
            .iter()
            .map(|(_, root)| scene.subtree_aabb(*root).unwrap().unwrap())
            .collect();
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn doors_link_rooms_both_ways() {
        let (scene, rooms) = built_rooms();
        for (index, (_, root)) in rooms.iter().enumerate() {
            let doors = crate::rooms::door_nodes(&scene, *root);
            let targets: Vec<usize> = doors.iter().map(|(_, target)| *target).collect();
            if index + 1 < rooms.len() {
                assert!(targets.contains(&(index + 1)), "room {index} links forward");
            }
            if index > 0 {
                assert!(targets.contains(&(index - 1)), "room {index} links back");
            }
        }
    }

    #[test]
    fn room3_overlay_starts_hidden() {
        let (scene, rooms) = built_rooms();
        let overlay = rooms[2].0.overlay_node().expect("room 3 has an overlay");
        assert!(!scene.node(overlay).unwrap().visible);
        for (index, (spec, _)) in rooms.iter().enumerate() {
            if index != 2 {
                assert!(spec.overlay_node().is_none());
            }
        }
    }

    #[test]
    fn shadow_figure_moves_over_time() {
        let (mut scene, mut rooms) = built_rooms();
        let (spec, root) = &mut rooms[5];
        spec.update(&mut scene, *root, 0.0, 0.016).unwrap();
        let meshes = scene.mesh_descendants(*root).unwrap();
        let figure = *meshes
            .iter()
            .find(|id| scene.node(**id).unwrap().name == "shadow_figure")
            .unwrap();
        let before = scene.world_position(figure).unwrap();

        spec.update(&mut scene, *root, 3.0, 0.016).unwrap();
        let after = scene.world_position(figure).unwrap();
        assert!(before.distance(after) > 0.1);
    }

    #[test]
    fn spawn_points_sit_inside_their_room_bounds() {
        for spec in standard_rooms() {
            assert!(spec.bounds().contains(spec.spawn()));
        }
    }
}
