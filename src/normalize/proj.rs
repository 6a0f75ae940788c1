use geo::{Coord, MapCoords, MultiLineString};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::NormalizeError;

/// Target CRS for the whole pipeline. Both tables are brought here before
/// any simplification or join happens.
pub const TARGET_CRS: &str = "EPSG:4326";

const WGS84_LONGLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// GRS80 ellipsoid constants, shared by every SIRGAS 2000 variant.
const GRS80_A: f64 = 6_378_137.0;
const GRS80_ES: f64 = 0.006_694_380_022_900_79;

// EPSG:5880 (SIRGAS 2000 / Brazil Polyconic): latitude of origin 0,
// central meridian 54°W, false easting 5_000_000 m, false northing
// 10_000_000 m.
const POLY_LON0_DEG: f64 = -54.0;
const POLY_X0: f64 = 5_000_000.0;
const POLY_Y0: f64 = 10_000_000.0;

/// Source reference systems recognized from a `.prj` sidecar. The SNV is
/// published in SIRGAS 2000, geographic, UTM-zoned, or Brazil Polyconic;
/// anything else must be converted upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceCrs {
    Wgs84,
    SirgasGeographic,
    SirgasUtm { zone: u8, south: bool },
    SirgasPolyconic,
}

impl SourceCrs {
    /// Loose WKT sniffing of the sidecar text. A missing sidecar is assumed
    /// to already be lon/lat WGS84.
    pub(crate) fn detect(prj_wkt: Option<&str>) -> Result<Self, NormalizeError> {
        let Some(wkt) = prj_wkt else {
            return Ok(Self::Wgs84);
        };
        let upper = wkt.to_uppercase();
        if upper.contains("UTM") {
            match parse_utm_zone(&upper) {
                Some((zone, south)) if upper.contains("SIRGAS") => {
                    Ok(Self::SirgasUtm { zone, south })
                }
                _ => Err(unsupported(&upper)),
            }
        } else if upper.contains("POLYCONIC") {
            if upper.contains("SIRGAS") {
                Ok(Self::SirgasPolyconic)
            } else {
                Err(unsupported(&upper))
            }
        } else if upper.contains("SIRGAS") {
            Ok(Self::SirgasGeographic)
        } else if upper.contains("WGS") || upper.contains("GCS") {
            Ok(Self::Wgs84)
        } else {
            Err(unsupported(&upper))
        }
    }
}

/// Pull the zone number and hemisphere out of an uppercased WKT name such as
/// `"SIRGAS 2000 / UTM ZONE 23S"` or `"SIRGAS_2000_UTM_ZONE_23S"`.
fn parse_utm_zone(upper: &str) -> Option<(u8, bool)> {
    let idx = upper.find("ZONE")?;
    let rest = upper[idx + 4..].trim_start_matches([' ', '_']);
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let zone: u8 = digits.parse().ok()?;
    if !(1..=60).contains(&zone) {
        return None;
    }
    let south = rest[digits.len()..].starts_with('S');
    Some((zone, south))
}

fn unsupported(wkt: &str) -> NormalizeError {
    let snippet: String = wkt.chars().take(80).collect();
    NormalizeError::Reprojection { detail: snippet }
}

fn proj_error(err: proj4rs::errors::Error) -> NormalizeError {
    NormalizeError::Reprojection {
        detail: err.to_string(),
    }
}

enum Projection {
    Identity,
    Polyconic,
    Proj4 { from: Proj, to: Proj },
}

/// Reprojects source coordinates into lon/lat EPSG:4326.
///
/// Geographic SIRGAS 2000 is coincident with WGS84 at map precision (its
/// `towgs84` terms are all zero), so only the projected variants need an
/// actual transform. UTM zones go through proj4rs; proj4rs does not ship a
/// `poly` projection, so EPSG:5880 is inverted directly.
pub(crate) struct Reprojector {
    projection: Projection,
}

impl Reprojector {
    pub(crate) fn new(src: SourceCrs) -> Result<Self, NormalizeError> {
        let projection = match src {
            SourceCrs::Wgs84 | SourceCrs::SirgasGeographic => Projection::Identity,
            SourceCrs::SirgasPolyconic => Projection::Polyconic,
            SourceCrs::SirgasUtm { zone, south } => {
                let hemisphere = if south { " +south" } else { "" };
                let from = Proj::from_proj_string(&format!(
                    "+proj=utm +zone={zone}{hemisphere} +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs"
                ))
                .map_err(proj_error)?;
                let to = Proj::from_proj_string(WGS84_LONGLAT).map_err(proj_error)?;
                Projection::Proj4 { from, to }
            }
        };
        Ok(Self { projection })
    }

    /// (x, y) in source units in, lon/lat degrees out.
    fn project(&self, x: f64, y: f64) -> Result<Coord<f64>, NormalizeError> {
        match &self.projection {
            Projection::Identity => Ok(Coord { x, y }),
            Projection::Polyconic => polyconic_inverse(x, y),
            Projection::Proj4 { from, to } => {
                let mut point = (x, y, 0.0);
                transform(from, to, &mut point).map_err(proj_error)?;
                // Longlat targets come back in radians.
                Ok(Coord {
                    x: point.0.to_degrees(),
                    y: point.1.to_degrees(),
                })
            }
        }
    }

    pub(crate) fn project_polyline(
        &self,
        geometry: &MultiLineString<f64>,
    ) -> Result<MultiLineString<f64>, NormalizeError> {
        geometry.try_map_coords(|coord| self.project(coord.x, coord.y))
    }
}

/// Ellipsoidal polyconic inverse (Snyder, Map Projections: A Working
/// Manual, eqs. 18-18..18-22), specialized to the EPSG:5880 parameters.
///
/// With the latitude of origin on the equator the northing equation is
/// `y = M(phi) + cot(phi) * (1 - cos E) / w` with `E = (lon - lon_0) *
/// sin(phi)` and `w = sqrt(1 - e^2 sin^2 phi)`; latitude is recovered by a
/// secant iteration on that equation, longitude follows in closed form.
fn polyconic_inverse(easting: f64, northing: f64) -> Result<Coord<f64>, NormalizeError> {
    let lon0 = POLY_LON0_DEG.to_radians();
    let x = (easting - POLY_X0) / GRS80_A;
    let y = (northing - POLY_Y0) / GRS80_A;

    // On the equator the iteration degenerates; the forward easting there
    // is exactly a * (lon - lon_0).
    if y.abs() < 1e-10 {
        return Ok(Coord {
            x: (lon0 + x).to_degrees(),
            y: 0.0,
        });
    }

    let residual = |phi: f64| -> f64 {
        let sp = phi.sin();
        if sp == 0.0 {
            return -y;
        }
        let cp = phi.cos();
        let w = (1.0 - GRS80_ES * sp * sp).sqrt();
        let e = (x * w * sp / cp).clamp(-1.0, 1.0).asin();
        meridian_arc(phi) + (cp / sp) * 2.0 * (e / 2.0).sin().powi(2) / w - y
    };

    // The meridian arc dominates the residual, so starting at phi ~ y
    // converges in a handful of steps.
    let mut p0 = y;
    let mut p1 = y + 1e-4;
    let mut f0 = residual(p0);
    let mut phi = None;
    for _ in 0..40 {
        let f1 = residual(p1);
        let df = f1 - f0;
        if df.abs() < 1e-18 {
            phi = Some(p1);
            break;
        }
        let p2 = p1 - f1 * (p1 - p0) / df;
        p0 = p1;
        f0 = f1;
        p1 = p2;
        if (p1 - p0).abs() < 1e-12 {
            phi = Some(p1);
            break;
        }
    }
    let Some(phi) = phi else {
        return Err(NormalizeError::Reprojection {
            detail: format!("polyconic inverse did not converge at ({easting}, {northing})"),
        });
    };

    let sp = phi.sin();
    let w = (1.0 - GRS80_ES * sp * sp).sqrt();
    let e = (x * w * sp / phi.cos()).clamp(-1.0, 1.0).asin();
    Ok(Coord {
        x: (lon0 + e / sp).to_degrees(),
        y: phi.to_degrees(),
    })
}

/// Meridian arc length from the equator, normalized by the semi-major axis.
fn meridian_arc(phi: f64) -> f64 {
    let e2 = GRS80_ES;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * phi).sin()
}
