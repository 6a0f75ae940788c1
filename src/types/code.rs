use std::fmt;

use serde::Serialize;

/// Scrub a raw cell: trim whitespace and drop the `.0` residue spreadsheet
/// exports leave on numeric columns.
pub(crate) fn scrub(raw: &str) -> &str {
    let s = raw.trim();
    s.strip_suffix(".0").unwrap_or(s)
}

/// Left-pad a scrubbed value with zeros to `width`. Empty stays empty so a
/// missing code never fabricates a real-looking one; values already at or
/// past `width` pass through unchanged.
fn zero_pad(raw: &str, width: usize) -> String {
    let s = scrub(raw);
    if s.is_empty() || s.len() >= width {
        s.to_string()
    } else {
        format!("{s:0>width$}")
    }
}

/// Split a `vl_codigo` cell (`"10;20"`) into scrubbed link codes.
pub(crate) fn split_link_codes(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(scrub)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Six-character zero-padded structure code (`cod_sgo`).
///
/// Always rendered fixed-width: numeric codes must never lose leading zeros,
/// so the value is a string from the moment it leaves the source table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StructureCode(String);

impl StructureCode {
    pub const WIDTH: usize = 6;

    pub fn parse(raw: &str) -> Self {
        Self(zero_pad(raw, Self::WIDTH))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StructureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Three-digit zero-padded federal route code (`br` on the structure side,
/// `vl_br` on the highway side). Both tables go through the same padding so
/// route comparisons are format-stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RouteCode(String);

impl RouteCode {
    pub const WIDTH: usize = 3;

    pub fn parse(raw: &str) -> Self {
        Self(zero_pad(raw, Self::WIDTH))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
