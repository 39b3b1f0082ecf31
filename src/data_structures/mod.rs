//! Showroom data structures: scene graphs, materials, textures and environments.
//!
//! - `scene_graph` holds the node tree and geometry of a loaded model
//! - `material` contains materials, texture slots and material roles
//! - `transform` holds per-node local transformations
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `environment` is the CPU side filtered environment map

pub mod environment;
pub mod material;
pub mod scene_graph;
pub mod texture;
pub mod transform;
