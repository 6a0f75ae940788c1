use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tempfile::{NamedTempFile, TempDir};
use zip::ZipArchive;

use crate::error::NormalizeError;

/// Locate the polyline layer (`.shp` member) inside a zip archive and extract
/// the whole archive into a fresh temporary directory.
///
/// The directory is unique per call, so concurrent sessions never collide,
/// and it removes itself when the returned handle drops, covering success,
/// error, and panic paths alike.
pub(crate) fn extract_shapefile_archive(
    zip_path: &Path,
) -> Result<(TempDir, PathBuf), NormalizeError> {
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;

    let shp_member = archive
        .file_names()
        .find(|name| {
            Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"))
        })
        .map(str::to_string)
        .ok_or_else(|| NormalizeError::MissingLayer {
            archive: zip_path.to_path_buf(),
        })?;

    let dir = TempDir::new()?;
    archive.extract(dir.path())?;
    let shp_path = dir.path().join(shp_member);
    Ok((dir, shp_path))
}

/// Write-then-rename for command outputs, so the target never holds a
/// partial file.
pub(crate) fn write_atomic(target: &Path, bytes: &[u8], force: bool) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    if !force && target.exists() {
        bail!(
            "Refusing to overwrite existing file: {} (use --force)",
            target.display()
        );
    }
    let mut tmp = NamedTempFile::new_in(target.parent().unwrap_or(Path::new(".")))
        .context("create temp file")?;
    tmp.write_all(bytes).context("write output")?;
    tmp.persist(target)
        .with_context(|| format!("rename to {}", target.display()))?;
    Ok(())
}
