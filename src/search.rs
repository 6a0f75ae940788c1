//! Typeahead suggestions over the structure table, matching on code,
//! description, or either combined order.

use ahash::AHashSet;
use serde::Serialize;

use crate::types::Structure;

/// One suggestion: the display label and the code to select on pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub label: String,
    pub code: String,
}

/// Case-insensitive substring search. An empty term yields nothing; rows
/// missing a code or description are skipped; duplicate labels keep their
/// first occurrence.
pub fn search_structures(term: &str, structures: &[Structure]) -> Vec<Suggestion> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    let mut seen = AHashSet::new();
    let mut out = Vec::new();
    for s in structures {
        let code = s.code.as_str();
        let description = s.description.trim();
        if code.is_empty() || description.is_empty() {
            continue;
        }
        let label = format!("{code} - {description}");
        // The label contains both halves, so matching it covers code-only
        // and description-only terms; the swapped order covers terms typed
        // "description - code".
        let matched = label.to_lowercase().contains(&term)
            || format!("{description} - {code}").to_lowercase().contains(&term);
        if matched && seen.insert(label.clone()) {
            out.push(Suggestion {
                label,
                code: code.to_string(),
            });
        }
    }
    out
}
