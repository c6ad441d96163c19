//! Zip packaging of exports
//!
//! Files are stored with their path relative to the export root,
//! `/`-separated. Directories are implied by the file paths and never
//! written as entries.

use crate::domain::{PadkitError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// What ended up in an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    pub archive_path: PathBuf,
    pub file_count: usize,
    /// Sum of the uncompressed file sizes
    pub total_bytes: u64,
    /// Size of the written zip
    pub archive_bytes: u64,
}

/// Zip the tree under `src` into `dest`
///
/// `dest` is skipped if it lies inside `src`. Entries are written in file
/// name order so the same tree always produces the same entry list.
///
/// # Errors
///
/// Returns `NotFound` when `src` is not a directory and `Archive` when
/// walking, reading, or writing fails.
pub fn archive_directory(src: &Path, dest: &Path) -> Result<ArchiveSummary> {
    if !src.is_dir() {
        return Err(PadkitError::NotFound(format!(
            "export folder {} does not exist",
            src.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path() != dest {
            files.push(entry.into_path());
        }
    }

    write_archive(src, &files, dest)
}

/// Zip the listed files, each named by its path relative to `root`
///
/// Only the given files are stored; anything else under `root` is left out.
///
/// # Errors
///
/// Returns `NotFound` when a listed file is missing and `Archive` when a
/// path lies outside `root` or reading or writing fails.
pub fn archive_files(root: &Path, files: &[PathBuf], dest: &Path) -> Result<ArchiveSummary> {
    let files = files
        .iter()
        .map(|file| if file.is_absolute() { file.clone() } else { root.join(file) })
        .collect::<Vec<_>>();

    if let Some(missing) = files.iter().find(|file| !file.is_file()) {
        return Err(PadkitError::NotFound(format!(
            "exported file {} does not exist",
            missing.display()
        )));
    }

    write_archive(root, &files, dest)
}

fn write_archive(root: &Path, files: &[PathBuf], dest: &Path) -> Result<ArchiveSummary> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            PadkitError::Archive(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }

    let file = File::create(dest)
        .map_err(|e| PadkitError::Archive(format!("cannot create {}: {}", dest.display(), e)))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    let mut file_count = 0;
    let mut total_bytes = 0;

    for path in files {
        let name = entry_name(root, path)?;
        zip.start_file(name.as_str(), options)?;
        let mut input = File::open(path).map_err(|e| {
            PadkitError::Archive(format!("cannot read {}: {}", path.display(), e))
        })?;
        total_bytes += std::io::copy(&mut input, &mut zip)?;
        file_count += 1;

        tracing::trace!(entry = %name, "Added archive entry");
    }

    let writer = zip.finish()?;
    writer
        .into_inner()
        .map_err(|e| PadkitError::Archive(format!("cannot flush {}: {}", dest.display(), e)))?
        .sync_all()?;

    let archive_bytes = std::fs::metadata(dest)?.len();
    tracing::info!(
        source = %root.display(),
        archive = %dest.display(),
        file_count,
        total_bytes,
        archive_bytes,
        "Archive written"
    );

    Ok(ArchiveSummary {
        archive_path: dest.to_path_buf(),
        file_count,
        total_bytes,
        archive_bytes,
    })
}

/// `/`-separated path of `path` relative to `root`
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|e| {
        PadkitError::Archive(format!("{} is outside {}: {}", path.display(), root.display(), e))
    })?;

    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str().to_str().ok_or_else(|| {
                PadkitError::Archive(format!("non UTF-8 path {}", relative.display()))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}
