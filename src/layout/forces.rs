use eframe::egui::{Vec2, vec2};

use super::params::ForceParams;
use super::quadtree::QuadNode;

const MIN_DISTANCE_SQ: f32 = 1.0;

fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

fn repulsion_between(point: Vec2, source: Vec2, charge: f32, alpha: f32) -> Vec2 {
    let delta = point - source;
    let distance_sq = delta.length_sq().max(MIN_DISTANCE_SQ);
    delta * (charge * alpha / distance_sq)
}

pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    charges: &[f32],
    params: &ForceParams,
    alpha: f32,
    force: &mut Vec2,
) {
    if node.count == 0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let other = positions[other_index];
            if (point - other).length_sq() < 1e-6 {
                *force += jiggle(index, other_index) * charges[other_index] * alpha;
                continue;
            }
            *force += repulsion_between(point, other, charges[other_index], alpha);
        }
        return;
    }

    let distance = (point - node.center_of_charge).length().max(1.0);
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < params.theta
        && node.count > 1;

    if can_approximate {
        *force += repulsion_between(point, node.center_of_charge, node.charge, alpha);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, positions, charges, params, alpha, force);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) padding: f32,
    pub(super) strength: f32,
    pub(super) max_distance_sq: f32,
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        jiggle(from, to)
    };

    let min_distance = radii[from] + radii[to] + params.padding;
    if distance < min_distance {
        let overlap_push = (min_distance - distance) * params.strength * 0.5;
        forces[from] += direction * overlap_push;
        forces[to] -= direction * overlap_push;
    }
}

pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for i in 0..node_a.indices.len() {
                for j in (i + 1)..node_a.indices.len() {
                    collide_pair(node_a.indices[i], node_a.indices[j], positions, radii, params, forces);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    collide_pair(from, to, positions, radii, params, forces);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, forces);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, forces,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, forces);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, forces);
        }
    }
}

pub(super) fn link_correction(
    source: Vec2,
    target: Vec2,
    rest_length: f32,
    strength: f32,
    alpha: f32,
) -> Vec2 {
    let delta = target - source;
    let distance = delta.length();
    if distance <= 0.0001 {
        return Vec2::ZERO;
    }
    delta * ((distance - rest_length) / distance * strength * alpha * 0.5)
}

pub(super) fn accumulate_cluster_separation(
    members: &[usize],
    positions: &[Vec2],
    params: &ForceParams,
    alpha: f32,
    forces: &mut [Vec2],
) {
    for (offset, &from) in members.iter().enumerate() {
        for &to in &members[offset + 1..] {
            let delta = positions[from] - positions[to];
            let distance = delta.length();
            if distance >= params.cluster_radius {
                continue;
            }
            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                jiggle(from, to)
            };
            let push = (params.cluster_radius - distance) * params.cluster_strength * alpha * 0.5;
            forces[from] += direction * push;
            forces[to] -= direction * push;
        }
    }
}
