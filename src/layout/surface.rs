use eframe::egui::{Pos2, Rect};
use tracing::debug;

use super::{LayoutEngine, LayoutSnapshot, Viewport};
use crate::collab::GraphData;
use crate::config::Configuration;
use crate::error::Result;
use crate::interaction::InteractionAdapter;

#[derive(Default)]
pub struct LayoutSurface {
    engine: Option<LayoutEngine>,
    interaction: InteractionAdapter,
    seed: Option<u64>,
    sessions: u64,
}

impl LayoutSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            engine: None,
            interaction: InteractionAdapter::default(),
            seed: Some(seed),
            sessions: 0,
        }
    }

    pub fn begin(
        &mut self,
        graph: &GraphData,
        config: &Configuration,
        viewport: Viewport,
    ) -> Result<&mut LayoutEngine> {
        self.end();

        let mut engine = match self.seed {
            Some(seed) => LayoutEngine::with_seed(seed.wrapping_add(self.sessions)),
            None => LayoutEngine::new(),
        };
        engine.start(graph, config, viewport)?;
        self.sessions += 1;
        debug!(session = self.sessions, "layout surface attached");
        Ok(self.engine.insert(engine))
    }

    pub fn end(&mut self) {
        self.interaction.detach();
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
    }

    pub fn is_active(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&LayoutEngine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut LayoutEngine> {
        self.engine.as_mut()
    }

    pub fn interaction(&self) -> &InteractionAdapter {
        &self.interaction
    }

    pub fn step(&mut self, ticks: usize) -> Result<usize> {
        match self.engine.as_mut() {
            Some(engine) => engine.step(ticks),
            None => Ok(0),
        }
    }

    pub fn snapshot(&self) -> Option<LayoutSnapshot> {
        self.engine.as_ref().and_then(LayoutEngine::snapshot)
    }

    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        match self.engine.as_mut() {
            Some(engine) => engine.resize(viewport),
            None => Ok(()),
        }
    }

    pub fn pointer_down(&mut self, rect: Rect, screen: Pos2) {
        match self.engine.as_mut() {
            Some(engine) => self.interaction.pointer_down(engine, rect, screen),
            None => self.interaction.detach(),
        }
    }

    pub fn pointer_move(&mut self, rect: Rect, screen: Pos2) {
        if let Some(engine) = self.engine.as_mut() {
            self.interaction.pointer_move(engine, rect, screen);
        }
    }

    pub fn pointer_up(&mut self) {
        match self.engine.as_mut() {
            Some(engine) => self.interaction.pointer_up(engine),
            None => self.interaction.detach(),
        }
    }

    pub fn scroll(&mut self, rect: Rect, pointer: Pos2, delta: f32) {
        self.interaction.scroll(rect, pointer, delta);
    }
}

impl Drop for LayoutSurface {
    fn drop(&mut self) {
        self.end();
    }
}
