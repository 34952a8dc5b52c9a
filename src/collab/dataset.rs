use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::graph::{Edge, GraphData};
use crate::error::{GraphError, Result};

pub const COLLABORATIONS_FILE: &str = "collaborations.json";

pub type Adjacency = BTreeMap<String, BTreeMap<String, u64>>;

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    graph: GraphData,
    neighbours: Vec<Vec<(usize, u64)>>,
    digest: String,
}

impl Dataset {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(COLLABORATIONS_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(GraphError::DatasetNotFound(path));
            }
            Err(error) => return Err(GraphError::io(error, path)),
        };
        let adjacency: Adjacency = serde_json::from_str(&raw)?;
        let dataset = Self::from_adjacency(&adjacency);
        info!(
            path = %path.display(),
            nodes = dataset.graph.node_count(),
            edges = dataset.graph.edge_count(),
            "loaded collaboration dataset"
        );
        Ok(dataset)
    }

    pub fn from_adjacency(adjacency: &Adjacency) -> Self {
        let mut weights: BTreeMap<(&str, &str), u64> = BTreeMap::new();
        let mut dangling = 0usize;
        for (artist, collaborators) in adjacency {
            for (collaborator, &weight) in collaborators {
                if collaborator == artist || weight == 0 {
                    continue;
                }
                if !adjacency.contains_key(collaborator) {
                    dangling += 1;
                    continue;
                }
                let key = if artist <= collaborator {
                    (artist.as_str(), collaborator.as_str())
                } else {
                    (collaborator.as_str(), artist.as_str())
                };
                weights
                    .entry(key)
                    .and_modify(|existing| {
                        if *existing != weight {
                            debug!(
                                a = key.0,
                                b = key.1,
                                existing = *existing,
                                weight,
                                "asymmetric collaboration count"
                            );
                            *existing = (*existing).max(weight);
                        }
                    })
                    .or_insert(weight);
            }
        }
        if dangling > 0 {
            warn!(dangling, "dropped collaborations with artists missing from the dataset");
        }

        let edges = weights
            .into_iter()
            .map(|((a, b), weight)| Edge::canonical(a, b, weight))
            .collect::<Vec<_>>();
        let graph = GraphData::from_edges(adjacency.keys().cloned(), edges);
        Self::from_graph(graph)
    }

    pub fn from_graph(graph: GraphData) -> Self {
        let mut neighbours = vec![Vec::new(); graph.node_count()];
        for edge in graph.edges() {
            let (Some(source), Some(target)) =
                (graph.index_of(&edge.source), graph.index_of(&edge.target))
            else {
                continue;
            };
            neighbours[source].push((target, edge.weight));
            neighbours[target].push((source, edge.weight));
        }
        let digest = graph_digest(&graph);
        Self {
            graph,
            neighbours,
            digest,
        }
    }

    pub fn graph(&self) -> &GraphData {
        &self.graph
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub(super) fn neighbours(&self, index: usize) -> &[(usize, u64)] {
        self.neighbours.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn graph_digest(graph: &GraphData) -> String {
    let mut ids = graph.nodes().iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
    ids.sort_unstable();
    let mut edges = graph.edges().iter().collect::<Vec<_>>();
    edges.sort_by(|a, b| a.key().cmp(&b.key()));

    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update([0xffu8]);
    for edge in edges {
        hasher.update(edge.source.as_bytes());
        hasher.update([0u8]);
        hasher.update(edge.target.as_bytes());
        hasher.update([0u8]);
        hasher.update(edge.weight.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn adjacency(raw: &str) -> Adjacency {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn symmetric_pairs_count_once() {
        let dataset = Dataset::from_adjacency(&adjacency(
            r#"{"A": {"B": 2, "C": 1}, "B": {"A": 2}, "C": {"A": 1}}"#,
        ));
        let graph = dataset.graph();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node("A").unwrap().degree(), 3);
        assert_eq!(graph.node("B").unwrap().degree(), 2);
    }

    #[test]
    fn collaborators_outside_the_key_set_are_dropped() {
        let dataset = Dataset::from_adjacency(&adjacency(r#"{"A": {"Ghost": 4}, "B": {}}"#));
        assert_eq!(dataset.graph().node_count(), 2);
        assert_eq!(dataset.graph().edge_count(), 0);
        assert_eq!(dataset.graph().node("A").unwrap().degree(), 0);
    }

    #[test]
    fn asymmetric_counts_keep_the_larger_weight() {
        let dataset = Dataset::from_adjacency(&adjacency(r#"{"A": {"B": 2}, "B": {"A": 5}}"#));
        assert_eq!(dataset.graph().edges()[0].weight, 5);
        assert_eq!(dataset.graph().node("A").unwrap().degree(), 5);
    }

    #[test]
    fn digest_tracks_content() {
        let first = Dataset::from_adjacency(&adjacency(r#"{"A": {"B": 1}, "B": {"A": 1}}"#));
        let same = Dataset::from_adjacency(&adjacency(r#"{"B": {"A": 1}, "A": {"B": 1}}"#));
        let heavier = Dataset::from_adjacency(&adjacency(r#"{"A": {"B": 2}, "B": {"A": 2}}"#));
        assert_eq!(first.digest(), same.digest());
        assert_ne!(first.digest(), heavier.digest());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let error = Dataset::load(dir.path()).unwrap_err();
        assert!(matches!(error, GraphError::DatasetNotFound(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(COLLABORATIONS_FILE),
            r#"{"A": {"B": 3}, "B": {"A": 3}, "C": {}}"#,
        )
        .unwrap();
        let dataset = Dataset::load(dir.path()).unwrap();
        assert_eq!(dataset.graph().node_count(), 3);
        assert_eq!(dataset.graph().node("A").unwrap().degree(), 3);
        let a = dataset.graph().index_of("A").unwrap();
        let b = dataset.graph().index_of("B").unwrap();
        assert_eq!(dataset.neighbours(a), [(b, 3)]);
    }
}
