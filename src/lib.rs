//! Welded-topology editing kernel for polygon meshes.
//!
//! Polygons own their own vertex and edge records; coincident records are
//! grouped into merged vertices and merged edges stored in
//! [`topology::TopologyStore`]. The operations in [`operations`] re-weld,
//! split, bridge and re-smooth that topology while keeping every store
//! invariant intact.

pub mod config;
pub mod error;
pub mod factory;
pub mod host;
pub mod math;
pub mod operations;
pub mod selection;
pub mod tessellation;
pub mod topology;
pub mod union_find;

pub use config::EditConfig;
pub use error::{Result, WeldError};
pub use factory::{GeometryFactory, StoreFactory, TrackingFactory};
pub use host::{EditHost, NullHost, RecordingHost};
pub use selection::{Selection, SelectionUpdate};
pub use topology::TopologyStore;
