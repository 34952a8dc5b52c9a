mod dataset;
mod ego;
mod graph;
mod search;

pub use dataset::{Adjacency, COLLABORATIONS_FILE, Dataset};
pub use ego::MAX_EGO_DEGREE;
pub use graph::{Edge, GraphData, Node};
pub use search::SEARCH_RESULT_LIMIT;
