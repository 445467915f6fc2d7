mod make_mesh;

pub use make_mesh::{MakeMesh, NormalMode};
