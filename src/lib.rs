#![doc = "OAE/SNV reconciliation and cascading-filter pipeline"]
pub mod cli;
pub mod commands;
mod common;
mod error;
mod filter;
mod io;
mod normalize;
mod project;
mod search;
mod session;
mod types;

#[doc(inline)]
pub use error::NormalizeError;

#[doc(inline)]
pub use normalize::{NormalizedPair, TARGET_CRS, load_pair};

#[doc(inline)]
pub use filter::{FilterOptions, FilterOutcome, FilterState, apply};

#[doc(inline)]
pub use project::Report;

#[doc(inline)]
pub use search::{Suggestion, search_structures};

#[doc(inline)]
pub use session::Session;

#[doc(inline)]
pub use types::{HighwaySegment, RouteCode, Structure, StructureCode};

#[doc(inline)]
pub use io::geojson::{segments_to_geojson, structures_to_geojson};
