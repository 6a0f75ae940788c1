use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning the two uploaded artifacts into a
/// [`NormalizedPair`](crate::NormalizedPair).
///
/// All of these are terminal for the upload session: the caller must correct
/// the input and re-upload. An empty filter result is not an error and never
/// appears here.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A required column is absent from one of the input tables.
    #[error("table '{table}' is missing required column(s): {cols}", cols = .columns.join(", "))]
    MissingColumns {
        table: &'static str,
        columns: Vec<String>,
    },

    /// The uploaded archive holds no polyline layer.
    #[error("no .shp layer found in archive {path}", path = .archive.display())]
    MissingLayer { archive: PathBuf },

    /// The polyline layer declares a CRS this pipeline cannot reproject.
    #[error("unsupported source CRS: {detail}")]
    Reprojection { detail: String },

    /// A cell that must be numeric (latitude/longitude) is not.
    #[error("row {row}: column '{column}' holds non-numeric value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to read table: {0}")]
    Table(#[from] polars::error::PolarsError),

    #[error("failed to read shapefile: {0}")]
    Shapefile(#[from] shapefile::Error),
}
