use rand::Rng;
use rand::seq::index;
use tracing::debug;

use crate::collab::GraphData;
use crate::config::ShrinkMethod;
use crate::error::{GraphError, Result};

pub fn reduce(graph: &GraphData, limit: usize, method: ShrinkMethod) -> Result<GraphData> {
    reduce_with_rng(graph, limit, method, &mut rand::thread_rng())
}

pub fn reduce_with_rng<R: Rng + ?Sized>(
    graph: &GraphData,
    limit: usize,
    method: ShrinkMethod,
    rng: &mut R,
) -> Result<GraphData> {
    if limit == 0 {
        return Err(GraphError::InvalidConfig(
            "vertexLimit must be positive".to_owned(),
        ));
    }

    let node_count = graph.node_count();
    if node_count <= limit {
        return Ok(graph.clone());
    }

    let keep = match method {
        ShrinkMethod::ByDegree => top_by_degree(graph, limit),
        ShrinkMethod::Random => {
            let mut picked = index::sample(rng, node_count, limit).into_vec();
            picked.sort_unstable();
            picked
        }
    };

    let reduced = graph.induced(&keep);
    debug!(
        method = method.label(),
        limit,
        before_nodes = node_count,
        before_edges = graph.edge_count(),
        after_edges = reduced.edge_count(),
        "reduced graph"
    );
    Ok(reduced)
}

fn top_by_degree(graph: &GraphData, limit: usize) -> Vec<usize> {
    let nodes = graph.nodes();
    let mut order = (0..nodes.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        nodes[b]
            .degree()
            .cmp(&nodes[a].degree())
            .then_with(|| nodes[a].id.cmp(&nodes[b].id))
    });
    order.truncate(limit);
    order
}
