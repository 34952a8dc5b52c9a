use std::f32::consts::TAU;

use eframe::egui::{Pos2, pos2};
use rand::Rng;

use super::Viewport;
use crate::collab::Node;

pub fn circular_positions(count: usize, viewport: Viewport) -> Vec<Pos2> {
    let center = viewport.center();
    let radius = viewport.min_side() / 3.0;
    (0..count)
        .map(|index| {
            let angle = TAU * index as f32 / count as f32;
            pos2(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

pub fn shell_positions(nodes: &[Node], viewport: Viewport) -> Vec<Pos2> {
    let mut order = (0..nodes.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        nodes[b]
            .degree()
            .cmp(&nodes[a].degree())
            .then_with(|| nodes[a].id.cmp(&nodes[b].id))
    });

    let shell_size = nodes.len().div_ceil(3).max(1);
    let center = viewport.center();
    let step = viewport.min_side() / 6.0;
    let mut positions = vec![center; nodes.len()];
    for (rank, &index) in order.iter().enumerate() {
        let shell = rank / shell_size;
        let radius = (shell as f32 + 1.0) * step;
        let angle = (rank % shell_size) as f32 * TAU / shell_size as f32;
        positions[index] = pos2(center.x + radius * angle.cos(), center.y + radius * angle.sin());
    }
    positions
}

pub fn random_positions<R: Rng + ?Sized>(rng: &mut R, count: usize, viewport: Viewport) -> Vec<Pos2> {
    let padding = (viewport.min_side() * 0.1).min(40.0);
    (0..count)
        .map(|_| {
            pos2(
                rng.gen_range(padding..=viewport.width - padding),
                rng.gen_range(padding..=viewport.height - padding),
            )
        })
        .collect()
}

pub(super) fn initial_spread<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    viewport: Viewport,
) -> Vec<Pos2> {
    let center = viewport.center();
    let reach_x = viewport.width / 4.0;
    let reach_y = viewport.height / 4.0;
    (0..count)
        .map(|_| {
            pos2(
                center.x + rng.gen_range(-reach_x..=reach_x),
                center.y + rng.gen_range(-reach_y..=reach_y),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(900.0, 600.0).unwrap()
    }

    #[test]
    fn circle_is_exact_and_evenly_spaced() {
        let positions = circular_positions(7, viewport());
        let center = viewport().center();
        for (index, point) in positions.iter().enumerate() {
            assert!(((*point - center).length() - 200.0).abs() < 1e-3);
            let expected = TAU * index as f32 / 7.0;
            let actual = (point.y - center.y).atan2(point.x - center.x).rem_euclid(TAU);
            assert!((actual - expected).abs() < 1e-3 || (actual - expected).abs() > TAU - 1e-3);
        }
    }

    #[test]
    fn shells_put_heavy_nodes_inside() {
        let nodes = (0..9)
            .map(|index| Node::new(format!("n{index}"), 9 - index as u64))
            .collect::<Vec<_>>();
        let positions = shell_positions(&nodes, viewport());
        let center = viewport().center();
        let radius = |index: usize| (positions[index] - center).length();

        for index in 0..3 {
            assert!((radius(index) - 100.0).abs() < 1e-3);
            assert!((radius(index + 3) - 200.0).abs() < 1e-3);
            assert!((radius(index + 6) - 300.0).abs() < 1e-3);
        }
    }

    #[test]
    fn random_positions_stay_inside_the_margin() {
        let mut rng = StdRng::seed_from_u64(7);
        for point in random_positions(&mut rng, 200, viewport()) {
            assert!((40.0..=860.0).contains(&point.x));
            assert!((40.0..=560.0).contains(&point.y));
        }
    }
}
