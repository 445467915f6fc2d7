mod border_edges;
mod islands;

pub use border_edges::BorderEdges;
pub use islands::Islands;
