//! Result Projection: row counts and read-only views over the filtered pair,
//! ready for hand-off to a renderer. No further logic lives here; an empty
//! result is a normal state, not an error.

use serde::Serialize;

use crate::filter::{FilterOptions, FilterOutcome};
use crate::types::{HighwaySegment, Structure};

impl<'a> FilterOutcome<'a> {
    pub fn segments(&self) -> impl Iterator<Item = &'a HighwaySegment> + '_ {
        self.segment_rows.iter().map(|&i| &self.pair.segments[i])
    }

    pub fn structures(&self) -> impl Iterator<Item = &'a Structure> + '_ {
        self.structure_rows.iter().map(|&i| &self.pair.structures[i])
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segment_rows.len()
    }

    #[inline]
    pub fn structure_count(&self) -> usize {
        self.structure_rows.len()
    }

    /// True when the filters left nothing on either side: "no results",
    /// distinct from a load failure.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segment_rows.is_empty() && self.structure_rows.is_empty()
    }

    #[inline]
    pub fn crs(&self) -> &'static str {
        self.pair.crs
    }

    pub fn report(&self) -> Report {
        Report {
            crs: self.crs(),
            segment_count: self.segment_count(),
            structure_count: self.structure_count(),
            empty: self.is_empty(),
            options: self.options.clone(),
        }
    }
}

/// Summary handed to the rendering boundary: counts plus the option domains
/// for the next round of selections.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub crs: &'static str,
    pub segment_count: usize,
    pub structure_count: usize,
    pub empty: bool,
    pub options: FilterOptions,
}
