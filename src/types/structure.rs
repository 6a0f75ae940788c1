use geo::Point;

use super::code::{RouteCode, StructureCode};

/// One OAE record: a bridge, viaduct, or other special-works point from the
/// structure inventory table.
///
/// Immutable after normalization. Coordinates are lon/lat in the pipeline's
/// target CRS (EPSG:4326).
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub code: StructureCode,
    /// Free-text description (`descr_obra`).
    pub description: String,
    /// Structure category (`tipo_obra`).
    pub category: String,
    /// Federative unit (`uf`).
    pub uf: String,
    /// Federal route the structure sits on (`br`), zero-padded to 3.
    pub route: RouteCode,
    /// Conflict tag (`tipo_conflito`), when the inventory carries one.
    pub conflict: Option<String>,
    /// SNV link codes this structure references (`vl_codigo`, split on `;`).
    pub link_codes: Vec<String>,
    /// Inventory grade (`nota_sgo`), carried for map popups.
    pub grade: Option<String>,
    pub point: Point<f64>,
    /// Deterministic Street View deep link, derived from (lat, lon).
    pub streetview_link: String,
}

impl Structure {
    #[inline]
    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.point.x()
    }
}

/// Street View URL template the map popups open. Pure function of the
/// coordinates, so equal inputs always produce equal links.
pub(crate) fn streetview_link(lat: f64, lon: f64) -> String {
    format!("https://www.google.com/maps?q=&layer=c&cbll={lat},{lon}&cbp=12,90,0,0,5")
}
