use eframe::egui::{Pos2, Rect, Vec2};
use tracing::warn;

use crate::layout::{LayoutEngine, LayoutSnapshot};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub pan: Vec2,
    zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn world_to_screen(&self, rect: Rect, world: Pos2) -> Pos2 {
        rect.min + self.pan + world.to_vec2() * self.zoom
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Pos2 {
        ((screen - rect.min - self.pan) / self.zoom).to_pos2()
    }

    pub fn zoom_about(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        let world_before = self.screen_to_world(rect, pointer);
        self.set_zoom(self.zoom * factor);
        self.pan = pointer - rect.min - world_before.to_vec2() * self.zoom;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Panning { last: Pos2 },
    Dragging { index: usize },
}

#[derive(Debug)]
pub struct InteractionAdapter {
    transform: ViewTransform,
    gesture: Gesture,
}

impl Default for InteractionAdapter {
    fn default() -> Self {
        Self {
            transform: ViewTransform::default(),
            gesture: Gesture::Idle,
        }
    }
}

impl InteractionAdapter {
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    pub fn hit_test(&self, snapshot: &LayoutSnapshot, rect: Rect, screen: Pos2) -> Option<usize> {
        snapshot
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let center = self.transform.world_to_screen(rect, node.position);
                let distance = center.distance(screen);
                (distance <= node.radius * self.transform.zoom).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub fn pointer_down(&mut self, engine: &mut LayoutEngine, rect: Rect, screen: Pos2) {
        let hit = engine
            .snapshot()
            .and_then(|snapshot| self.hit_test(&snapshot, rect, screen));

        let Some(index) = hit else {
            self.gesture = Gesture::Panning { last: screen };
            return;
        };

        let world = self.transform.screen_to_world(rect, screen);
        match engine.pointer_down(index, world) {
            Ok(()) => self.gesture = Gesture::Dragging { index },
            Err(error) => {
                warn!(index, %error, "drag rejected by layout session");
                self.gesture = Gesture::Idle;
            }
        }
    }

    pub fn pointer_move(&mut self, engine: &mut LayoutEngine, rect: Rect, screen: Pos2) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Panning { last } => {
                self.transform.pan += screen - last;
                self.gesture = Gesture::Panning { last: screen };
            }
            Gesture::Dragging { index } => {
                let world = self.transform.screen_to_world(rect, screen);
                if let Err(error) = engine.pointer_move(world) {
                    warn!(index, %error, "drag move rejected by layout session");
                    self.gesture = Gesture::Idle;
                }
            }
        }
    }

    pub fn pointer_up(&mut self, engine: &mut LayoutEngine) {
        if let Gesture::Dragging { index } = self.gesture
            && let Err(error) = engine.pointer_up()
        {
            warn!(index, %error, "drag release rejected by layout session");
        }
        self.gesture = Gesture::Idle;
    }

    pub fn scroll(&mut self, rect: Rect, pointer: Pos2, delta: f32) {
        if delta.abs() <= f32::EPSILON {
            return;
        }
        let factor = (1.0 + (delta * 0.0018)).clamp(0.85, 1.15);
        self.transform.zoom_about(rect, pointer, factor);
    }

    pub fn detach(&mut self) {
        self.gesture = Gesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::collab::{Edge, GraphData};
    use crate::config::{Configuration, LayoutKind};
    use crate::layout::Viewport;

    fn rect() -> Rect {
        Rect::from_min_size(pos2(10.0, 20.0), vec2(300.0, 300.0))
    }

    fn circular_engine() -> LayoutEngine {
        let graph = GraphData::from_edges(
            ["a", "b", "c", "d"],
            vec![Edge::canonical("a", "b", 3), Edge::canonical("c", "d", 1)],
        );
        let config = Configuration {
            layout: LayoutKind::Circular,
            ..Configuration::default()
        };
        let mut engine = LayoutEngine::with_seed(5);
        engine
            .start(&graph, &config, Viewport::new(300.0, 300.0).unwrap())
            .unwrap();
        engine
    }

    #[test]
    fn zoom_is_clamped() {
        let mut transform = ViewTransform::default();
        transform.set_zoom(50.0);
        assert_eq!(transform.zoom(), MAX_ZOOM);
        transform.set_zoom(0.0);
        assert_eq!(transform.zoom(), MIN_ZOOM);
        transform.set_zoom(f32::NAN);
        assert_eq!(transform.zoom(), MIN_ZOOM);

        let mut adapter = InteractionAdapter::default();
        for _ in 0..500 {
            adapter.scroll(rect(), pos2(50.0, 50.0), 400.0);
        }
        assert_eq!(adapter.transform().zoom(), MAX_ZOOM);
    }

    #[test]
    fn zoom_keeps_the_point_under_the_pointer() {
        let mut transform = ViewTransform {
            pan: vec2(15.0, -4.0),
            ..ViewTransform::default()
        };
        let pointer = pos2(120.0, 90.0);
        let before = transform.screen_to_world(rect(), pointer);
        transform.zoom_about(rect(), pointer, 1.15);
        let after = transform.screen_to_world(rect(), pointer);
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn transform_round_trips() {
        let mut transform = ViewTransform {
            pan: vec2(-30.0, 12.0),
            ..ViewTransform::default()
        };
        transform.set_zoom(2.5);
        let world = pos2(40.0, 75.0);
        let back = transform.screen_to_world(rect(), transform.world_to_screen(rect(), world));
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn pressing_a_node_drags_it() {
        let mut engine = circular_engine();
        let mut adapter = InteractionAdapter::default();
        let snapshot = engine.snapshot().unwrap();
        let on_node = adapter
            .transform()
            .world_to_screen(rect(), snapshot.nodes[2].position);

        adapter.pointer_down(&mut engine, rect(), on_node);
        assert!(adapter.is_dragging());
        assert_eq!(engine.dragging(), Some(2));

        adapter.pointer_move(&mut engine, rect(), pos2(60.0, 70.0));
        engine.step(1).unwrap();
        let moved = engine.snapshot().unwrap().nodes[2].position;
        assert_eq!(moved, pos2(50.0, 50.0));

        adapter.pointer_up(&mut engine);
        assert!(!adapter.is_dragging());
        assert_eq!(engine.dragging(), None);
    }

    #[test]
    fn pressing_empty_space_pans() {
        let mut engine = circular_engine();
        let mut adapter = InteractionAdapter::default();
        adapter.pointer_down(&mut engine, rect(), pos2(160.0, 170.0));
        assert!(adapter.is_panning());
        adapter.pointer_move(&mut engine, rect(), pos2(170.0, 165.0));
        adapter.pointer_up(&mut engine);
        assert_eq!(adapter.transform().pan, vec2(10.0, -5.0));
        assert_eq!(engine.dragging(), None);
    }

    #[test]
    fn stopped_session_errors_are_swallowed() {
        let mut engine = circular_engine();
        let mut adapter = InteractionAdapter::default();
        let on_node = adapter
            .transform()
            .world_to_screen(rect(), engine.snapshot().unwrap().nodes[0].position);
        adapter.pointer_down(&mut engine, rect(), on_node);
        engine.stop();
        adapter.pointer_move(&mut engine, rect(), pos2(1.0, 1.0));
        adapter.pointer_up(&mut engine);
        assert!(!adapter.is_dragging());
    }
}
