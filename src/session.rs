//! Per-upload memoization: re-running filters never re-parses or
//! re-extracts source files.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::NormalizeError;
use crate::normalize::{self, NormalizedPair};

type UploadKey = ([u8; 32], [u8; 32]);

/// One interactive session. The normalized pair is cached under the SHA-256
/// of both input files, so a byte-identical re-invocation returns the same
/// `Arc` without touching the parsers; different bytes replace the cache.
#[derive(Default)]
pub struct Session {
    cached: Option<(UploadKey, Arc<NormalizedPair>)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or reuse) the normalized pair for this pair of files.
    pub fn load(
        &mut self,
        oae_csv: &Path,
        snv_zip: &Path,
    ) -> Result<Arc<NormalizedPair>, NormalizeError> {
        let key = (file_digest(oae_csv)?, file_digest(snv_zip)?);
        if let Some((cached_key, pair)) = &self.cached {
            if *cached_key == key {
                return Ok(Arc::clone(pair));
            }
        }
        let pair = Arc::new(normalize::load_pair(oae_csv, snv_zip)?);
        self.cached = Some((key, Arc::clone(&pair)));
        Ok(pair)
    }
}

fn file_digest(path: &Path) -> Result<[u8; 32], NormalizeError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().into())
}
