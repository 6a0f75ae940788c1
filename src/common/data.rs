use std::fs::File;
use std::path::Path;

use polars::frame::DataFrame;
use polars::io::SerReader;
use polars::prelude::CsvReadOptions;
use shapefile::{Shape, dbase::Record};

use crate::error::NormalizeError;

/// Reads a CSV file from `path` into a Polars DataFrame with every column
/// typed as a string, so numeric-looking codes keep their leading zeros.
pub(crate) fn read_csv_all_strings(path: &Path) -> Result<DataFrame, NormalizeError> {
    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_shapefile(path: &Path) -> Result<Vec<(Shape, Record)>, NormalizeError> {
    let mut reader = shapefile::Reader::from_path(path)?;
    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        items.push(result?);
    }
    Ok(items)
}
