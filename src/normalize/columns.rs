use ahash::AHashSet;
use polars::frame::DataFrame;

use crate::error::NormalizeError;

/// Canonical form of a header or dbase field name: trimmed, lowercased,
/// spaces replaced with underscores. Upstream files disagree on casing and
/// stray whitespace; everything downstream assumes these names.
pub(crate) fn canonical(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Apply header canonicalization to every column of a DataFrame.
pub(crate) fn canonicalize_headers(df: &mut DataFrame) -> Result<(), NormalizeError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| canonical(name.as_str()))
        .collect();
    df.set_column_names(names)?;
    Ok(())
}

/// Check once that `table` carries every column in `required`, reporting all
/// missing ones at once. Later stages index columns without re-checking.
pub(crate) fn require_columns(
    df: &DataFrame,
    table: &'static str,
    required: &[&str],
) -> Result<(), NormalizeError> {
    let have: AHashSet<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|c| !have.contains(**c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(NormalizeError::MissingColumns {
            table,
            columns: missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn canonical_strips_lowercases_and_underscores() {
        assert_eq!(canonical(" Latitude "), "latitude");
        assert_eq!(canonical("Tipo Obra"), "tipo_obra");
        assert_eq!(canonical("COD_SGO"), "cod_sgo");
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let mut df = df!(" Latitude " => ["-5.1"], "UF" => ["MA"]).unwrap();
        canonicalize_headers(&mut df).unwrap();
        let err = require_columns(&df, "oae", &["latitude", "longitude", "cod_sgo"]).unwrap_err();
        match err {
            NormalizeError::MissingColumns { table, columns } => {
                assert_eq!(table, "oae");
                assert_eq!(columns, vec!["longitude", "cod_sgo"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
