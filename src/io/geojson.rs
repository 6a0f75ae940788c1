//! GeoJSON hand-off: the filtered tables become two FeatureCollections
//! carrying the attribute columns the map layers show in tooltips and
//! popups. Codes stay strings, coordinates stay floats, and the CRS is
//! declared on the collection.

use serde_json::{Value, json};

use crate::filter::FilterOutcome;
use crate::types::{HighwaySegment, Structure};

/// Filtered highway segments as a MultiLineString FeatureCollection.
pub fn segments_to_geojson(outcome: &FilterOutcome<'_>) -> Value {
    let features: Vec<Value> = outcome.segments().map(segment_feature).collect();
    feature_collection(features, outcome.crs())
}

/// Filtered structures as a Point FeatureCollection.
pub fn structures_to_geojson(outcome: &FilterOutcome<'_>) -> Value {
    let features: Vec<Value> = outcome.structures().map(structure_feature).collect();
    feature_collection(features, outcome.crs())
}

fn segment_feature(segment: &HighwaySegment) -> Value {
    let coordinates: Vec<Vec<Vec<f64>>> = segment
        .geometry
        .0
        .iter()
        .map(|line| line.coords().map(|c| vec![c.x, c.y]).collect())
        .collect();
    json!({
        "type": "Feature",
        "geometry": {
            "type": "MultiLineString",
            "coordinates": coordinates,
        },
        "properties": {
            "vl_br": segment.route.as_str(),
            "sg_uf": segment.uf,
            "vl_codigo": segment.link_code,
            "ds_tipo_ad": segment.admin_type,
            "ds_coinc": segment.coincidence,
            "ds_jurisdi": segment.jurisdiction,
            "ds_superfi": segment.surface,
            "ul": segment.local_unit,
        }
    })
}

fn structure_feature(structure: &Structure) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [structure.lon(), structure.lat()],
        },
        "properties": {
            "cod_sgo": structure.code.as_str(),
            "descr_obra": structure.description,
            "tipo_obra": structure.category,
            "uf": structure.uf,
            "br": structure.route.as_str(),
            "nota_sgo": structure.grade,
            "tipo_conflito": structure.conflict,
            "vl_codigo": structure.link_codes.join(";"),
            "streetview_link": structure.streetview_link,
        }
    })
}

fn feature_collection(features: Vec<Value>, crs: &str) -> Value {
    json!({
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": crs } },
        "features": features,
    })
}
