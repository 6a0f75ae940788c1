//! Geospatial Normalizer: parses the two uploaded artifacts into one
//! immutable, CRS-unified pair of typed tables.
//!
//! Order matters here: headers are canonicalized first, then schemas are
//! validated, then geometry is reprojected into [`TARGET_CRS`], and only
//! then simplified. Both tables load or the whole call fails; a one-sided
//! success never leaks out.

mod columns;
mod proj;

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use geo::{Coord, LineString, MultiLineString, Point, SimplifyVwPreserve};
use polars::frame::DataFrame;
use polars::prelude::StringChunked;
use shapefile::{
    Shape,
    dbase::{FieldValue, Record},
};

use crate::common::{data, fs as archive};
use crate::error::NormalizeError;
use crate::types::{
    HighwaySegment, RouteCode, Structure, StructureCode, scrub, split_link_codes, streetview_link,
};

pub use proj::TARGET_CRS;

use proj::{Reprojector, SourceCrs};

/// Visvalingam-Whyatt area tolerance for polyline simplification, in square
/// degrees. Tied to [`TARGET_CRS`] being geographic: it corresponds to a
/// linear tolerance around 1e-3 degrees, and a metric CRS would need an
/// epsilon several orders of magnitude larger.
const SIMPLIFY_EPSILON_DEG2: f64 = 1e-6;

const OAE_TABLE: &str = "oae";
const SNV_TABLE: &str = "snv";

const OAE_REQUIRED: &[&str] = &[
    "latitude",
    "longitude",
    "cod_sgo",
    "descr_obra",
    "tipo_obra",
    "uf",
    "br",
];
const SNV_REQUIRED: &[&str] = &["vl_br", "sg_uf"];

/// The Normalizer's output: both tables in [`TARGET_CRS`], immutable from
/// here on. The Filter Engine only ever borrows this.
#[derive(Debug)]
pub struct NormalizedPair {
    pub segments: Vec<HighwaySegment>,
    pub structures: Vec<Structure>,
    pub crs: &'static str,
}

/// Load, validate, and CRS-unify the structure table (CSV) and the highway
/// archive (zipped shapefile).
pub fn load_pair(oae_csv: &Path, snv_zip: &Path) -> Result<NormalizedPair, NormalizeError> {
    let structures = load_structures(oae_csv)?;
    let segments = load_segments(snv_zip)?;
    Ok(NormalizedPair {
        segments,
        structures,
        crs: TARGET_CRS,
    })
}

fn load_structures(path: &Path) -> Result<Vec<Structure>, NormalizeError> {
    let mut df = data::read_csv_all_strings(path)?;
    columns::canonicalize_headers(&mut df)?;
    columns::require_columns(&df, OAE_TABLE, OAE_REQUIRED)?;

    let latitude = df.column("latitude")?.str()?;
    let longitude = df.column("longitude")?.str()?;
    let code = df.column("cod_sgo")?.str()?;
    let description = df.column("descr_obra")?.str()?;
    let category = df.column("tipo_obra")?.str()?;
    let uf = df.column("uf")?.str()?;
    let route = df.column("br")?.str()?;
    let conflict = optional_column(&df, "tipo_conflito");
    let link_codes = optional_column(&df, "vl_codigo");
    let grade = optional_column(&df, "nota_sgo");

    let mut out = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let (Some(lat), Some(lon)) = (
            parse_coordinate(latitude.get(row), row, "latitude")?,
            parse_coordinate(longitude.get(row), row, "longitude")?,
        ) else {
            // Rows without coordinates cannot be placed on the map.
            continue;
        };
        out.push(Structure {
            code: StructureCode::parse(code.get(row).unwrap_or("")),
            description: cell(description, row),
            category: cell(category, row),
            uf: cell(uf, row),
            route: RouteCode::parse(route.get(row).unwrap_or("")),
            conflict: optional_cell(conflict, row),
            link_codes: link_codes
                .and_then(|c| c.get(row))
                .map(split_link_codes)
                .unwrap_or_default(),
            grade: optional_cell(grade, row),
            point: Point::new(lon, lat),
            streetview_link: streetview_link(lat, lon),
        });
    }
    Ok(out)
}

fn load_segments(zip_path: &Path) -> Result<Vec<HighwaySegment>, NormalizeError> {
    // The extraction dir drops (and deletes itself) when this function
    // returns, on every path.
    let (_extract_dir, shp_path) = archive::extract_shapefile_archive(zip_path)?;
    let items = data::read_shapefile(&shp_path)?;
    require_fields(&items)?;

    let prj_wkt = read_prj_sidecar(&shp_path);
    let reproject = Reprojector::new(SourceCrs::detect(prj_wkt.as_deref())?)?;

    let mut out = Vec::with_capacity(items.len());
    for (shape, record) in items {
        let Some(geometry) = polyline_geometry(&shape) else {
            continue;
        };
        let geometry = reproject.project_polyline(&geometry)?;
        let geometry = geometry.simplify_vw_preserve(&SIMPLIFY_EPSILON_DEG2);
        let fields = field_map(record);
        out.push(HighwaySegment {
            route: RouteCode::parse(fields.get("vl_br").map(String::as_str).unwrap_or("")),
            uf: fields.get("sg_uf").cloned().unwrap_or_default(),
            link_code: fields
                .get("vl_codigo")
                .map(|v| scrub(v).to_string())
                .filter(|v| !v.is_empty()),
            admin_type: fields.get("ds_tipo_ad").cloned(),
            coincidence: fields.get("ds_coinc").cloned(),
            jurisdiction: fields.get("ds_jurisdi").cloned(),
            surface: fields.get("ds_superfi").cloned(),
            local_unit: fields.get("ul").cloned(),
            geometry,
        });
    }
    Ok(out)
}

fn optional_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a StringChunked> {
    df.column(name).ok().and_then(|c| c.str().ok())
}

fn cell(column: &StringChunked, row: usize) -> String {
    column.get(row).map(str::trim).unwrap_or("").to_string()
}

fn optional_cell(column: Option<&StringChunked>, row: usize) -> Option<String> {
    column
        .and_then(|c| c.get(row))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `Ok(None)` for a blank cell (the row is skipped), an error only for a
/// non-empty cell that does not parse.
fn parse_coordinate(
    raw: Option<&str>,
    row: usize,
    column: &'static str,
) -> Result<Option<f64>, NormalizeError> {
    let value = raw.map(str::trim).unwrap_or("");
    if value.is_empty() {
        return Ok(None);
    }
    // Brazilian spreadsheets export comma decimals.
    value
        .replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| NormalizeError::InvalidValue {
            row,
            column,
            value: value.to_string(),
        })
}

/// Validate the dbase schema once, off the first record, so a renamed or
/// absent join column fails loudly instead of producing empty segments.
fn require_fields(items: &[(Shape, Record)]) -> Result<(), NormalizeError> {
    let Some((_, record)) = items.first() else {
        return Ok(());
    };
    let have: Vec<String> = record
        .clone()
        .into_iter()
        .map(|(name, _)| columns::canonical(&name))
        .collect();
    let missing: Vec<String> = SNV_REQUIRED
        .iter()
        .filter(|c| !have.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(NormalizeError::MissingColumns {
            table: SNV_TABLE,
            columns: missing,
        })
    }
}

fn read_prj_sidecar(shp_path: &Path) -> Option<String> {
    for ext in ["prj", "PRJ"] {
        let path = shp_path.with_extension(ext);
        if let Ok(text) = fs::read_to_string(&path) {
            return Some(text);
        }
    }
    None
}

fn polyline_geometry(shape: &Shape) -> Option<MultiLineString<f64>> {
    fn lines<P>(parts: &[Vec<P>], coord: impl Fn(&P) -> Coord<f64>) -> Vec<LineString<f64>> {
        parts
            .iter()
            .map(|part| part.iter().map(&coord).collect())
            .collect()
    }

    let parts = match shape {
        Shape::Polyline(p) => lines(p.parts(), |pt| Coord { x: pt.x, y: pt.y }),
        Shape::PolylineM(p) => lines(p.parts(), |pt| Coord { x: pt.x, y: pt.y }),
        Shape::PolylineZ(p) => lines(p.parts(), |pt| Coord { x: pt.x, y: pt.y }),
        _ => return None,
    };
    Some(MultiLineString::new(parts))
}

/// Flatten a dbase record into canonical-name → trimmed-text pairs. Empty
/// values are dropped so "present but blank" and "absent" read the same.
fn field_map(record: Record) -> AHashMap<String, String> {
    let mut map = AHashMap::new();
    for (name, value) in record {
        let text = match value {
            FieldValue::Character(v) => v.unwrap_or_default(),
            FieldValue::Numeric(v) => v.map(format_numeric).unwrap_or_default(),
            FieldValue::Float(v) => v.map(|f| format_numeric(f64::from(f))).unwrap_or_default(),
            FieldValue::Integer(v) => v.to_string(),
            FieldValue::Logical(v) => v.map(|b| b.to_string()).unwrap_or_default(),
            _ => String::new(),
        };
        let text = text.trim().to_string();
        if !text.is_empty() {
            map.insert(columns::canonical(&name), text);
        }
    }
    map
}

/// Render dbase numerics without a fractional part when they are whole, so a
/// route code reads "10" rather than "10.0".
fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
