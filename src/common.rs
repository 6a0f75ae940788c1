//! Shared low-level helpers: archive handling and raw readers.

pub(crate) mod data;
pub(crate) mod fs;
