use geo::MultiLineString;

use super::code::RouteCode;

/// One SNV record: a georeferenced stretch of federal highway with its
/// attribute columns.
///
/// Geometry is lon/lat in the pipeline's target CRS (EPSG:4326), simplified
/// exactly once at load time; immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct HighwaySegment {
    /// Route code (`vl_br`), zero-padded to 3.
    pub route: RouteCode,
    /// Federative unit (`sg_uf`).
    pub uf: String,
    /// Internal route identifier (`vl_codigo`), the fine-grained join key
    /// against `Structure::link_codes`.
    pub link_code: Option<String>,
    /// Administrative jurisdiction type (`ds_tipo_ad`).
    pub admin_type: Option<String>,
    /// Coincidence descriptor (`ds_coinc`).
    pub coincidence: Option<String>,
    /// Jurisdiction descriptor (`ds_jurisdi`).
    pub jurisdiction: Option<String>,
    /// Surface descriptor (`ds_superfi`).
    pub surface: Option<String>,
    /// Local unit (`ul`).
    pub local_unit: Option<String>,
    pub geometry: MultiLineString<f64>,
}
