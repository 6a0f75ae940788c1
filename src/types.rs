//! Typed record schemas for the two datasets. Columns are resolved and
//! validated once at normalization time; everything downstream works on
//! these structs instead of string-keyed tables.

mod code;
mod segment;
mod structure;

pub use code::{RouteCode, StructureCode};
pub(crate) use code::{scrub, split_link_codes};
pub use segment::HighwaySegment;
pub use structure::Structure;
pub(crate) use structure::streetview_link;
