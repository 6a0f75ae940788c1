//! Serialization at the renderer boundary.

pub mod geojson;
