//! Boundary loops of polygon regions and repair of branch vertices on them.

mod extract;
mod fix;

pub use extract::{BorderLoop, BorderLoops, LoopSplit};
pub use fix::FixBorder;
