mod forces;
mod params;
mod placement;
mod quadtree;
mod surface;

use std::collections::HashMap;
use std::sync::Arc;

use eframe::egui::{Pos2, Vec2, pos2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::collab::GraphData;
use crate::config::{Configuration, LayoutKind};
use crate::error::{GraphError, Result};
use crate::util::{CancellationToken, node_radius};
use forces::{
    CollisionParams, accumulate_cluster_separation, accumulate_collision_pairs,
    accumulate_repulsion_for_node, link_correction,
};
pub use params::{
    DRAG_ALPHA_TARGET, DYNAMIC_ALPHA_TARGET, EGO_LINK_K, EGO_REPULSION_K, ForceParams,
    IMPULSE_INTERVAL_TICKS, ego_link_strength, ego_repulsion,
};
pub use placement::{circular_positions, random_positions, shell_positions};
use quadtree::QuadNode;
pub use surface::LayoutSurface;

pub type RedrawCallback = Box<dyn FnMut(&LayoutSnapshot) -> anyhow::Result<()> + Send>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "viewport must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn center(self) -> Pos2 {
        pos2(self.width * 0.5, self.height * 0.5)
    }

    pub fn min_side(self) -> f32 {
        self.width.min(self.height)
    }

    pub fn clamp(self, point: Pos2) -> Pos2 {
        pos2(point.x.clamp(0.0, self.width), point.y.clamp(0.0, self.height))
    }

    pub fn contains(self, point: Pos2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
}

impl SessionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeState {
    pub position: Pos2,
    pub radius: f32,
    pub pinned: bool,
    pub special: bool,
    pub degree: u64,
    pub distance: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeState {
    pub source: usize,
    pub target: usize,
    pub weight: u64,
}

#[derive(Clone, Debug)]
pub struct LayoutSnapshot {
    pub tick: u64,
    pub alpha: f32,
    pub viewport: Viewport,
    pub ids: Arc<[String]>,
    pub names: Arc<[String]>,
    pub nodes: Vec<NodeState>,
    pub edges: Arc<[EdgeState]>,
}

impl LayoutSnapshot {
    pub fn position_of(&self, id: &str) -> Option<Pos2> {
        let index = self.ids.iter().position(|candidate| candidate == id)?;
        self.nodes.get(index).map(|node| node.position)
    }
}

#[derive(Clone, Debug, Default)]
pub struct StopHandle(CancellationToken);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.cancel();
    }

    pub fn is_requested(&self) -> bool {
        self.0.is_cancelled()
    }
}

struct SimNode {
    position: Pos2,
    velocity: Vec2,
    pin: Option<Pos2>,
    charge: f32,
    radius: f32,
    degree: u64,
    distance: Option<u32>,
}

struct SimLink {
    source: usize,
    target: usize,
    strength: f32,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    charges: Vec<f32>,
    radii: Vec<f32>,
    forces: Vec<Vec2>,
}

struct Session {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    clusters: Vec<Vec<usize>>,
    ids: Arc<[String]>,
    names: Arc<[String]>,
    edges: Arc<[EdgeState]>,
    params: ForceParams,
    layout: LayoutKind,
    special: Option<usize>,
    viewport: Viewport,
    alpha: f32,
    alpha_target: f32,
    tick: u64,
    dragging: Option<usize>,
    scratch: Scratch,
}

impl Session {
    fn new<R: Rng + ?Sized>(
        graph: &GraphData,
        config: &Configuration,
        viewport: Viewport,
        rng: &mut R,
    ) -> Self {
        let params = ForceParams::resolve(config.layout, config.dynamic_mode);
        let special = graph.ego_focus();
        let graph_nodes = graph.nodes();
        let count = graph_nodes.len();

        let (min_degree, max_degree) = graph_nodes
            .iter()
            .map(|node| node.degree())
            .fold((u64::MAX, 0), |(lo, hi), degree| (lo.min(degree), hi.max(degree)));

        let (positions, pinned) = match config.layout {
            LayoutKind::Circular => (circular_positions(count, viewport), true),
            LayoutKind::Shell => (shell_positions(graph_nodes, viewport), true),
            LayoutKind::Random => (random_positions(rng, count, viewport), false),
            LayoutKind::Spring | LayoutKind::KamadaKawai | LayoutKind::FruchtermanReingold => {
                (placement::initial_spread(rng, count, viewport), false)
            }
        };

        let mut nodes = graph_nodes
            .iter()
            .zip(positions)
            .map(|(node, position)| {
                let distance = special.and(node.distance_from_special);
                let charge = match distance {
                    Some(distance) => ego_repulsion(params.charge, distance),
                    None => params.charge,
                };
                let position = viewport.clamp(position);
                SimNode {
                    position,
                    velocity: Vec2::ZERO,
                    pin: pinned.then_some(position),
                    charge,
                    radius: node_radius(node.degree(), min_degree, max_degree),
                    degree: node.degree(),
                    distance,
                }
            })
            .collect::<Vec<_>>();

        if let Some(index) = special {
            let center = viewport.center();
            nodes[index].position = center;
            nodes[index].pin = Some(center);
        }

        let mut links = Vec::with_capacity(graph.edge_count());
        let mut edges = Vec::with_capacity(graph.edge_count());
        for edge in graph.edges() {
            let (Some(source), Some(target)) =
                (graph.index_of(&edge.source), graph.index_of(&edge.target))
            else {
                continue;
            };
            let strength = match (nodes[source].distance, nodes[target].distance) {
                (Some(from), Some(to)) => ego_link_strength(params.link_strength, from, to),
                _ => params.link_strength,
            };
            links.push(SimLink {
                source,
                target,
                strength,
            });
            edges.push(EdgeState {
                source,
                target,
                weight: edge.weight,
            });
        }

        let mut by_cluster: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, node) in graph_nodes.iter().enumerate() {
            if let Some(key) = node.cluster_key.as_deref() {
                by_cluster.entry(key).or_default().push(index);
            }
        }
        let clusters = by_cluster
            .into_values()
            .filter(|members| members.len() > 1)
            .collect();

        let alpha = if pinned { 0.0 } else { 1.0 };
        Self {
            nodes,
            links,
            clusters,
            ids: graph_nodes.iter().map(|node| node.id.clone()).collect(),
            names: graph_nodes.iter().map(|node| node.name.clone()).collect(),
            edges: edges.into(),
            params,
            layout: config.layout,
            special,
            viewport,
            alpha,
            alpha_target: params.alpha_target,
            tick: 0,
            dragging: None,
            scratch: Scratch::default(),
        }
    }

    fn is_settled(&self) -> bool {
        self.nodes.is_empty()
            || (self.alpha < self.params.alpha_min && self.alpha_target < self.params.alpha_min)
    }

    fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let count = self.nodes.len();
        let alpha = self.alpha;
        let params = self.params;

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.charges.clear();
        scratch.radii.clear();
        scratch.forces.clear();
        scratch.forces.resize(count, Vec2::ZERO);
        let mut max_radius = 0.0_f32;
        for node in &self.nodes {
            scratch.positions.push(node.position.to_vec2());
            scratch.charges.push(node.charge);
            scratch.radii.push(node.radius);
            max_radius = max_radius.max(node.radius);
        }

        let forces = &mut scratch.forces;
        let positions = &scratch.positions;

        if let Some(tree) = QuadNode::build(positions, &scratch.charges) {
            for (index, force) in forces.iter_mut().enumerate() {
                accumulate_repulsion_for_node(
                    &tree,
                    index,
                    positions,
                    &scratch.charges,
                    &params,
                    alpha,
                    force,
                );
            }

            let reach = max_radius * 2.0 + params.collision_padding;
            accumulate_collision_pairs(
                &tree,
                &tree,
                true,
                positions,
                &scratch.radii,
                CollisionParams {
                    padding: params.collision_padding,
                    strength: params.collision_strength,
                    max_distance_sq: reach * reach,
                },
                forces,
            );
        }

        for link in &self.links {
            let correction = link_correction(
                positions[link.source],
                positions[link.target],
                params.link_distance,
                link.strength,
                alpha,
            );
            forces[link.source] += correction;
            forces[link.target] -= correction;
        }

        let center = self.viewport.center().to_vec2();
        for (force, position) in forces.iter_mut().zip(positions) {
            *force += (center - *position) * (params.center_strength * alpha);
        }

        for members in &self.clusters {
            accumulate_cluster_separation(members, positions, &params, alpha, forces);
        }

        let retained = 1.0 - params.velocity_decay;
        for (node, force) in self.nodes.iter_mut().zip(forces.iter()) {
            if let Some(pin) = node.pin {
                node.position = self.viewport.clamp(pin);
                node.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = (node.velocity + *force) * retained;
            let speed = velocity.length();
            if speed > params.max_speed {
                velocity *= params.max_speed / speed;
            }
            node.velocity = velocity;
            node.position = self.viewport.clamp(node.position + velocity);
        }

        self.alpha += (self.alpha_target - self.alpha) * params.alpha_decay;
        self.tick += 1;

        if let Some(interval) = params.impulse_interval
            && self.tick % interval == 0
            && count > 0
        {
            let index = rng.gen_range(0..count);
            let reach = params::IMPULSE_MAX_SPEED;
            let impulse = vec2(rng.gen_range(-reach..=reach), rng.gen_range(-reach..=reach));
            self.nodes[index].velocity += impulse;
            debug!(tick = self.tick, index, "perpetual-motion impulse");
        }
    }

    fn release(&mut self, index: usize) {
        let center = self.viewport.center();
        let node = &mut self.nodes[index];
        if Some(index) == self.special {
            node.pin = Some(center);
        } else if !self.layout.is_pinned() {
            node.pin = None;
        }
        debug!(index, "drag released");
    }

    fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            tick: self.tick,
            alpha: self.alpha,
            viewport: self.viewport,
            ids: Arc::clone(&self.ids),
            names: Arc::clone(&self.names),
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(index, node)| NodeState {
                    position: node.position,
                    radius: node.radius,
                    pinned: node.pin.is_some(),
                    special: Some(index) == self.special,
                    degree: node.degree,
                    distance: node.distance,
                })
                .collect(),
            edges: Arc::clone(&self.edges),
        }
    }
}

pub struct LayoutEngine {
    state: SessionState,
    session: Option<Session>,
    on_tick: Option<RedrawCallback>,
    stop_requests: StopHandle,
    rng: StdRng,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: SessionState::Idle,
            session: None,
            on_tick: None,
            stop_requests: StopHandle::default(),
            rng,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop_requests.clone()
    }

    pub fn on_tick<F>(&mut self, callback: F)
    where
        F: FnMut(&LayoutSnapshot) -> anyhow::Result<()> + Send + 'static,
    {
        self.on_tick = Some(Box::new(callback));
    }

    pub fn start(
        &mut self,
        graph: &GraphData,
        config: &Configuration,
        viewport: Viewport,
    ) -> Result<()> {
        self.expect_state(SessionState::Idle)?;
        config.validate()?;

        let session = Session::new(graph, config, viewport, &mut self.rng);
        info!(
            nodes = session.nodes.len(),
            edges = session.links.len(),
            layout = config.layout.label(),
            ego = session.special.is_some(),
            dynamic = config.dynamic_mode,
            "layout session started"
        );
        self.session = Some(session);
        self.state = SessionState::Running;
        Ok(())
    }

    pub fn step(&mut self, ticks: usize) -> Result<usize> {
        match self.state {
            SessionState::Idle => {
                return Err(GraphError::SessionState {
                    expected: SessionState::Running.label(),
                    actual: SessionState::Idle.label(),
                });
            }
            SessionState::Stopped => return Ok(0),
            SessionState::Running => {}
        }

        let mut ran = 0;
        for _ in 0..ticks {
            if self.stop_requests.is_requested() {
                self.stop();
                break;
            }
            let Some(session) = self.session.as_mut() else {
                break;
            };
            if session.is_settled() {
                break;
            }

            session.tick(&mut self.rng);
            ran += 1;

            if let Some(callback) = self.on_tick.as_mut() {
                let snapshot = session.snapshot();
                if let Err(error) = callback(&snapshot) {
                    warn!(tick = snapshot.tick, error = %error, "redraw listener failed");
                }
            }
        }

        if self.stop_requests.is_requested() {
            self.stop();
        }
        Ok(ran)
    }

    pub fn is_settled(&self) -> bool {
        self.session.as_ref().is_none_or(Session::is_settled)
    }

    pub fn snapshot(&self) -> Option<LayoutSnapshot> {
        self.session.as_ref().map(Session::snapshot)
    }

    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        let session = self.running_session()?;
        session.viewport = viewport;
        let center = viewport.center();
        for (index, node) in session.nodes.iter_mut().enumerate() {
            if Some(index) == session.special && session.dragging != Some(index) {
                node.pin = Some(center);
            }
            node.pin = node.pin.map(|pin| viewport.clamp(pin));
            node.position = node.pin.unwrap_or_else(|| viewport.clamp(node.position));
        }
        Ok(())
    }

    pub fn pointer_down(&mut self, index: usize, at: Pos2) -> Result<()> {
        let session = self.running_session()?;
        if index >= session.nodes.len() {
            return Err(GraphError::UnknownNode(index));
        }
        if session.params.impulse_interval.is_none() {
            session.alpha_target = DRAG_ALPHA_TARGET;
        }
        if let Some(previous) = session.dragging
            && previous != index
        {
            session.release(previous);
        }
        let at = session.viewport.clamp(at);
        session.nodes[index].pin = Some(at);
        session.dragging = Some(index);
        debug!(index, "drag started");
        Ok(())
    }

    pub fn pointer_move(&mut self, at: Pos2) -> Result<()> {
        let session = self.running_session()?;
        if let Some(index) = session.dragging {
            session.nodes[index].pin = Some(session.viewport.clamp(at));
        }
        Ok(())
    }

    /// Releases the dragged node. The focal node of an ego network returns
    /// to the centre; nodes of a pinned layout stay where they were dropped.
    pub fn pointer_up(&mut self) -> Result<()> {
        let session = self.running_session()?;
        session.alpha_target = session.params.alpha_target;
        if let Some(index) = session.dragging.take() {
            session.release(index);
        }
        Ok(())
    }

    pub fn dragging(&self) -> Option<usize> {
        self.session.as_ref().and_then(|session| session.dragging)
    }

    pub fn stop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        let was = self.state;
        self.state = SessionState::Stopped;
        self.on_tick = None;
        self.stop_requests.request_stop();
        if let Some(session) = self.session.take() {
            debug!(tick = session.tick, from = was.label(), "layout session stopped");
        }
    }

    fn expect_state(&self, expected: SessionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GraphError::SessionState {
                expected: expected.label(),
                actual: self.state.label(),
            })
        }
    }

    fn running_session(&mut self) -> Result<&mut Session> {
        self.expect_state(SessionState::Running)?;
        self.session.as_mut().ok_or(GraphError::SessionState {
            expected: SessionState::Running.label(),
            actual: SessionState::Stopped.label(),
        })
    }
}

impl Drop for LayoutEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::collab::{Adjacency, Dataset, Edge};

    fn viewport() -> Viewport {
        Viewport::new(400.0, 300.0).unwrap()
    }

    fn config(layout: LayoutKind, dynamic_mode: bool) -> Configuration {
        Configuration {
            layout,
            dynamic_mode,
            ..Configuration::default()
        }
    }

    fn star(leaves: usize) -> GraphData {
        let ids = std::iter::once("hub".to_string())
            .chain((0..leaves).map(|index| format!("leaf{index}")))
            .collect::<Vec<_>>();
        let edges = (0..leaves)
            .map(|index| Edge::canonical("hub", &format!("leaf{index}"), 1 + index as u64))
            .collect();
        GraphData::from_edges(ids, edges)
    }

    fn ego_graph() -> GraphData {
        let adjacency: Adjacency = serde_json::from_str(
            r#"{
                "Drake": {"Future": 6, "Rihanna": 4},
                "Future": {"Drake": 6, "Metro Boomin": 5},
                "Rihanna": {"Drake": 4},
                "Metro Boomin": {"Future": 5}
            }"#,
        )
        .unwrap();
        Dataset::from_adjacency(&adjacency)
            .ego_network("Drake", 2)
            .unwrap()
    }

    fn running(graph: &GraphData, layout: LayoutKind, dynamic: bool) -> LayoutEngine {
        let mut engine = LayoutEngine::with_seed(11);
        engine.start(graph, &config(layout, dynamic), viewport()).unwrap();
        engine
    }

    #[test]
    fn every_tick_stays_inside_the_viewport() {
        let graph = star(40);
        for layout in LayoutKind::ALL {
            let mut engine = running(&graph, layout, false);
            let violations = Arc::new(AtomicUsize::new(0));
            let seen = Arc::clone(&violations);
            engine.on_tick(move |snapshot| {
                let outside = snapshot
                    .nodes
                    .iter()
                    .filter(|node| !snapshot.viewport.contains(node.position))
                    .count();
                seen.fetch_add(outside, Ordering::SeqCst);
                Ok(())
            });
            engine.pointer_down(3, pos2(-500.0, 9_000.0)).unwrap();
            engine.step(150).unwrap();
            engine.pointer_up().unwrap();
            engine.step(150).unwrap();
            assert_eq!(violations.load(Ordering::SeqCst), 0, "{}", layout.label());
        }
    }

    #[test]
    fn circular_layout_is_pinned_and_still() {
        let graph = star(5);
        let mut engine = running(&graph, LayoutKind::Circular, false);
        let before = engine.snapshot().unwrap();
        assert!(engine.is_settled());
        assert_eq!(engine.step(10).unwrap(), 0);

        let center = viewport().center();
        for node in &before.nodes {
            assert!(node.pinned);
            assert!(((node.position - center).length() - 100.0).abs() < 1e-3);
        }
        let after = engine.snapshot().unwrap();
        assert_eq!(before.nodes, after.nodes);
    }

    #[test]
    fn random_layout_is_free_to_move() {
        let graph = star(6);
        let mut engine = running(&graph, LayoutKind::Random, false);
        let before = engine.snapshot().unwrap();
        assert!(before.nodes.iter().all(|node| !node.pinned));
        assert!(engine.step(5).unwrap() > 0);
        let after = engine.snapshot().unwrap();
        assert_ne!(before.nodes, after.nodes);
    }

    #[test]
    fn simulation_cools_down() {
        let graph = star(8);
        let mut engine = running(&graph, LayoutKind::Spring, false);
        let ran = engine.step(5_000).unwrap();
        assert!(ran < 5_000);
        assert!(engine.is_settled());
        assert!(engine.snapshot().unwrap().alpha < 0.001);
    }

    #[test]
    fn dynamic_mode_keeps_moving() {
        let graph = star(8);
        let mut engine = running(&graph, LayoutKind::Spring, true);
        assert_eq!(engine.step(2_000).unwrap(), 2_000);
        assert!(!engine.is_settled());
        assert!(engine.snapshot().unwrap().alpha >= DYNAMIC_ALPHA_TARGET * 0.9);
    }

    fn hold_at(engine: &mut LayoutEngine, at: Pos2) {
        let session = engine.session.as_mut().unwrap();
        for node in &mut session.nodes {
            node.position = at;
            node.velocity = Vec2::ZERO;
        }
    }

    #[test]
    fn dynamic_impulse_fires_on_the_interval() {
        let graph = GraphData::from_edges(["solo"], Vec::new());
        let mut engine = running(&graph, LayoutKind::Spring, true);
        let center = viewport().center();
        let interval = IMPULSE_INTERVAL_TICKS as usize;

        assert_eq!(engine.step(interval - 2).unwrap(), interval - 2);
        hold_at(&mut engine, center);
        engine.step(1).unwrap();
        let session = engine.session.as_ref().unwrap();
        assert_eq!(session.tick, IMPULSE_INTERVAL_TICKS - 1);
        assert_eq!(session.nodes[0].velocity, Vec2::ZERO);

        hold_at(&mut engine, center);
        engine.step(1).unwrap();
        let session = engine.session.as_ref().unwrap();
        assert_eq!(session.tick, IMPULSE_INTERVAL_TICKS);
        let kick = session.nodes[0].velocity;
        assert!(kick != Vec2::ZERO);
        assert!(kick.x.abs() <= params::IMPULSE_MAX_SPEED);
        assert!(kick.y.abs() <= params::IMPULSE_MAX_SPEED);
    }

    #[test]
    fn resize_clamps_nodes_and_recentres_the_focal_node() {
        let graph = ego_graph();
        let mut engine = running(&graph, LayoutKind::Spring, false);
        engine.step(40).unwrap();

        let smaller = Viewport::new(120.0, 90.0).unwrap();
        engine.resize(smaller).unwrap();
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.viewport, smaller);
        assert!(snapshot.nodes.iter().all(|node| smaller.contains(node.position)));
        let focal = snapshot.nodes.iter().position(|node| node.special).unwrap();
        assert!(snapshot.nodes[focal].pinned);
        assert_eq!(snapshot.nodes[focal].position, smaller.center());

        engine.step(20).unwrap();
        let snapshot = engine.snapshot().unwrap();
        assert!(snapshot.nodes.iter().all(|node| smaller.contains(node.position)));
        assert_eq!(snapshot.nodes[focal].position, smaller.center());
    }

    #[test]
    fn focal_node_is_centred_and_repinned() {
        let graph = ego_graph();
        let mut engine = running(&graph, LayoutKind::Spring, false);
        let snapshot = engine.snapshot().unwrap();
        let focal = snapshot.nodes.iter().position(|node| node.special).unwrap();
        assert_eq!(snapshot.nodes[focal].position, viewport().center());
        assert!(snapshot.nodes[focal].pinned);

        engine.pointer_down(focal, pos2(20.0, 20.0)).unwrap();
        engine.step(3).unwrap();
        assert_eq!(engine.snapshot().unwrap().nodes[focal].position, pos2(20.0, 20.0));
        engine.pointer_up().unwrap();
        engine.step(1).unwrap();
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.nodes[focal].position, viewport().center());
        assert!(snapshot.nodes[focal].pinned);
    }

    #[test]
    fn ordinary_nodes_are_released_after_drag() {
        let graph = star(4);
        let mut engine = running(&graph, LayoutKind::Spring, false);
        engine.pointer_down(2, pos2(10.0, 10.0)).unwrap();
        assert_eq!(engine.dragging(), Some(2));
        engine.pointer_move(pos2(50.0, 60.0)).unwrap();
        engine.step(2).unwrap();
        assert_eq!(engine.snapshot().unwrap().nodes[2].position, pos2(50.0, 60.0));
        engine.pointer_up().unwrap();
        assert!(!engine.snapshot().unwrap().nodes[2].pinned);
        assert_eq!(engine.dragging(), None);
    }

    #[test]
    fn second_pointer_down_releases_the_first_node() {
        let graph = star(4);
        let mut engine = running(&graph, LayoutKind::Spring, false);
        engine.pointer_down(0, pos2(10.0, 10.0)).unwrap();
        engine.pointer_down(1, pos2(80.0, 90.0)).unwrap();
        assert_eq!(engine.dragging(), Some(1));
        assert!(!engine.snapshot().unwrap().nodes[0].pinned);

        engine.pointer_up().unwrap();
        let snapshot = engine.snapshot().unwrap();
        assert!(!snapshot.nodes[0].pinned);
        assert!(!snapshot.nodes[1].pinned);
    }

    #[test]
    fn switching_drags_away_from_the_focal_node_recentres_it() {
        let graph = ego_graph();
        let mut engine = running(&graph, LayoutKind::Spring, false);
        let snapshot = engine.snapshot().unwrap();
        let focal = snapshot.nodes.iter().position(|node| node.special).unwrap();
        let other = (focal + 1) % graph.node_count();

        engine.pointer_down(focal, pos2(15.0, 25.0)).unwrap();
        engine.pointer_down(other, pos2(300.0, 200.0)).unwrap();
        engine.step(1).unwrap();
        let snapshot = engine.snapshot().unwrap();
        assert!(snapshot.nodes[focal].pinned);
        assert_eq!(snapshot.nodes[focal].position, viewport().center());
        assert_eq!(snapshot.nodes[other].position, pos2(300.0, 200.0));
    }

    #[test]
    fn pinned_layouts_keep_the_drop_position() {
        let graph = star(4);
        let mut engine = running(&graph, LayoutKind::Shell, false);
        engine.pointer_down(1, pos2(30.0, 40.0)).unwrap();
        engine.step(1).unwrap();
        engine.pointer_up().unwrap();
        let node = engine.snapshot().unwrap().nodes[1];
        assert!(node.pinned);
        assert_eq!(node.position, pos2(30.0, 40.0));
    }

    #[test]
    fn dragging_reheats_a_settled_simulation() {
        let graph = star(4);
        let mut engine = running(&graph, LayoutKind::Spring, false);
        engine.step(5_000).unwrap();
        assert!(engine.is_settled());
        engine.pointer_down(0, pos2(5.0, 5.0)).unwrap();
        assert!(!engine.is_settled());
        assert_eq!(engine.step(10).unwrap(), 10);
    }

    #[test]
    fn ego_links_weaken_with_distance() {
        let graph = ego_graph();
        let engine = running(&graph, LayoutKind::Spring, false);
        let session = engine.session.as_ref().unwrap();
        let focal = session.special.unwrap();
        for link in &session.links {
            let far = session.nodes[link.source]
                .distance
                .max(session.nodes[link.target].distance)
                .unwrap();
            let expected = ego_link_strength(session.params.link_strength, far, 0);
            assert!((link.strength - expected).abs() < 1e-6);
        }
        assert_eq!(session.nodes[focal].charge, session.params.charge);
    }

    #[test]
    fn empty_graph_starts_and_idles() {
        let mut engine = running(&GraphData::empty(), LayoutKind::Spring, false);
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.step(10).unwrap(), 0);
        assert!(engine.snapshot().unwrap().nodes.is_empty());
    }

    #[test]
    fn lifecycle_is_enforced() {
        let mut engine = LayoutEngine::with_seed(1);
        assert!(matches!(engine.step(1), Err(GraphError::SessionState { .. })));
        engine
            .start(&star(2), &Configuration::default(), viewport())
            .unwrap();
        let again = engine.start(&star(2), &Configuration::default(), viewport());
        assert!(matches!(again, Err(GraphError::SessionState { .. })));
        assert!(matches!(
            engine.pointer_down(99, pos2(0.0, 0.0)),
            Err(GraphError::UnknownNode(99))
        ));

        engine.stop();
        engine.stop();
        assert_eq!(engine.state(), SessionState::Stopped);
        assert_eq!(engine.step(5).unwrap(), 0);
        assert!(engine.snapshot().is_none());
        assert!(engine.pointer_up().is_err());
    }

    #[test]
    fn stop_from_inside_a_tick() {
        let mut engine = running(&star(6), LayoutKind::Spring, false);
        let handle = engine.stop_handle();
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&ticks);
        engine.on_tick(move |snapshot| {
            seen.lock().unwrap().push(snapshot.tick);
            if snapshot.tick == 3 {
                handle.request_stop();
            }
            Ok(())
        });
        assert_eq!(engine.step(100).unwrap(), 3);
        assert_eq!(engine.state(), SessionState::Stopped);
        assert_eq!(*ticks.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn listener_errors_do_not_stop_ticking() {
        let mut engine = running(&star(6), LayoutKind::Spring, false);
        engine.on_tick(|_snapshot| Err(anyhow::anyhow!("surface went away")));
        assert_eq!(engine.step(20).unwrap(), 20);
        assert_eq!(engine.state(), SessionState::Running);
    }

    #[test]
    fn invalid_viewport_is_rejected() {
        assert!(Viewport::new(0.0, 10.0).is_err());
        assert!(Viewport::new(10.0, f32::NAN).is_err());
    }
}
