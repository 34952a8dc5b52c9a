use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    /// Sum of incident collaboration weights in the full dataset. It is not
    /// recomputed after reduction, so it can exceed the induced degree.
    degree: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_special: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_special: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_key: Option<String>,
}

impl Node {
    pub(crate) fn new(id: impl Into<String>, degree: u64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            degree,
            is_special: false,
            distance_from_special: None,
            cluster_key: None,
        }
    }

    pub fn degree(&self) -> u64 {
        self.degree
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub weight: u64,
}

impl Edge {
    pub fn canonical(a: &str, b: &str, weight: u64) -> Self {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self {
            source: source.to_owned(),
            target: target.to_owned(),
            weight,
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.source, &self.target)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

#[derive(Deserialize)]
struct GraphWire {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl From<GraphWire> for GraphData {
    fn from(wire: GraphWire) -> Self {
        GraphData::from_parts(wire.nodes, wire.edges)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GraphWire")]
pub struct GraphData {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index_by_id: HashMap<String, usize>,
}

impl GraphData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        let mut unique_nodes = Vec::with_capacity(nodes.len());
        for node in nodes {
            if index_by_id.contains_key(&node.id) {
                continue;
            }
            index_by_id.insert(node.id.clone(), unique_nodes.len());
            unique_nodes.push(node);
        }

        let mut seen = HashSet::with_capacity(edges.len());
        let mut kept = Vec::with_capacity(edges.len());
        let mut dangling = 0usize;
        for edge in edges {
            if edge.source == edge.target || edge.weight == 0 {
                continue;
            }
            if !index_by_id.contains_key(&edge.source) || !index_by_id.contains_key(&edge.target)
            {
                dangling += 1;
                continue;
            }
            let edge = Edge::canonical(&edge.source, &edge.target, edge.weight);
            if seen.insert((edge.source.clone(), edge.target.clone())) {
                kept.push(edge);
            }
        }

        if dangling > 0 {
            warn!(dangling, "dropped edges with missing endpoints");
        }

        Self {
            nodes: unique_nodes,
            edges: kept,
            index_by_id,
        }
    }

    pub fn from_edges<I, S>(ids: I, edges: Vec<Edge>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes = ids.into_iter().map(|id| Node::new(id, 0)).collect();
        let mut graph = Self::from_parts(nodes, edges);
        graph.recompute_degrees();
        graph
    }

    pub(crate) fn recompute_degrees(&mut self) {
        let mut degrees = vec![0u64; self.nodes.len()];
        for edge in &self.edges {
            if let Some(&index) = self.index_by_id.get(&edge.source) {
                degrees[index] += edge.weight;
            }
            if let Some(&index) = self.index_by_id.get(&edge.target) {
                degrees[index] += edge.weight;
            }
        }
        for (node, degree) in self.nodes.iter_mut().zip(degrees) {
            node.degree = degree;
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn induced(&self, keep: &[usize]) -> Self {
        let nodes = keep
            .iter()
            .filter_map(|&index| self.nodes.get(index).cloned())
            .collect::<Vec<_>>();
        let kept_ids = nodes.iter().map(|node| node.id.as_str()).collect::<HashSet<_>>();
        let edges = self
            .edges
            .iter()
            .filter(|edge| kept_ids.contains(edge.source.as_str()) && kept_ids.contains(edge.target.as_str()))
            .cloned()
            .collect();
        Self::from_parts(nodes, edges)
    }

    pub fn ego_focus(&self) -> Option<usize> {
        let mut special = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_special);
        let (index, _) = special.next()?;
        if special.next().is_some() {
            return None;
        }
        self.nodes
            .iter()
            .all(|node| node.distance_from_special.is_some())
            .then_some(index)
    }

    pub fn same_structure(&self, other: &Self) -> bool {
        if self.nodes.len() != other.nodes.len() || self.edges.len() != other.edges.len() {
            return false;
        }
        let nodes_match = self
            .nodes
            .iter()
            .all(|node| other.node(&node.id).is_some_and(|candidate| candidate == node));
        let other_edges = other.edges.iter().collect::<HashSet<_>>();
        nodes_match && self.edges.iter().all(|edge| other_edges.contains(edge))
    }
}
