use std::collections::VecDeque;

use tracing::debug;

use super::dataset::Dataset;
use super::graph::GraphData;
use crate::error::{GraphError, Result};
use crate::util::CancellationToken;

pub const MAX_EGO_DEGREE: u32 = 5;

impl Dataset {
    pub fn ego_network(&self, artist: &str, max_degree: u32) -> Result<GraphData> {
        self.ego_network_cancellable(artist, max_degree, &CancellationToken::new())
    }

    pub fn ego_network_cancellable(
        &self,
        artist: &str,
        max_degree: u32,
        token: &CancellationToken,
    ) -> Result<GraphData> {
        if !(1..=MAX_EGO_DEGREE).contains(&max_degree) {
            return Err(GraphError::InvalidDegree(max_degree));
        }

        let artist = artist.trim();
        let graph = self.graph();
        let focal = graph
            .index_of(artist)
            .ok_or_else(|| GraphError::ArtistNotFound(artist.to_owned()))?;

        let mut distance = vec![None; graph.node_count()];
        distance[focal] = Some(0u32);
        let mut order = vec![focal];
        let mut queue = VecDeque::from([(focal, 0u32)]);
        let mut level = 0u32;

        while let Some((current, hops)) = queue.pop_front() {
            if hops != level {
                level = hops;
                if token.is_cancelled() {
                    debug!(artist, level, "ego query cancelled");
                    return Err(GraphError::Cancelled);
                }
            }
            if hops >= max_degree {
                continue;
            }
            for &(next, _weight) in self.neighbours(current) {
                if distance[next].is_some() {
                    continue;
                }
                distance[next] = Some(hops + 1);
                order.push(next);
                queue.push_back((next, hops + 1));
            }
        }

        if token.is_cancelled() {
            return Err(GraphError::Cancelled);
        }

        let mut ego = graph.induced(&order);
        for node in ego.nodes_mut() {
            let hops = graph.index_of(&node.id).and_then(|index| distance[index]);
            node.is_special = node.id == artist;
            node.distance_from_special = hops;
            node.cluster_key = hops.map(|hops| format!("hop-{hops}"));
        }
        debug!(
            artist,
            max_degree,
            nodes = ego.node_count(),
            edges = ego.edge_count(),
            "built ego network"
        );
        Ok(ego)
    }
}
