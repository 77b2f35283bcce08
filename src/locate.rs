// src/locate.rs

//! Submission locator.
//!
//! Searches a submission tree for `<base_name>.<ext>` where `ext` is one of
//! the extensions known to [`Language`]. Directories are visited
//! depth-first in name order and the first match wins; every
//! subdirectory is searched, not only the first one.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::types::Language;

/// A located candidate source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    /// Directory that contains the source file; used as working directory.
    pub dir: PathBuf,
    /// File extension without the leading dot.
    pub extension: String,
    pub language: Language,
}

impl SubmissionRecord {
    /// Full path of the located source file.
    pub fn source_path(&self, base_name: &str) -> PathBuf {
        self.dir.join(format!("{base_name}.{}", self.extension))
    }
}

/// Find the candidate file `base_name.{py,java,c}` below `root`.
///
/// Returns `Ok(None)` when nothing matches. Only a failure to list `root`
/// itself is an error; unreadable subdirectories are skipped.
pub fn locate(fs: &dyn FileSystem, root: &Path, base_name: &str) -> Result<Option<SubmissionRecord>> {
    let entries = fs.read_dir(root)?;
    Ok(search_entries(fs, root, entries, base_name))
}

fn search_dir(fs: &dyn FileSystem, dir: &Path, base_name: &str) -> Option<SubmissionRecord> {
    match fs.read_dir(dir) {
        Ok(entries) => search_entries(fs, dir, entries, base_name),
        Err(err) => {
            warn!(dir = ?dir, error = %err, "skipping unreadable directory");
            None
        }
    }
}

fn search_entries(
    fs: &dyn FileSystem,
    dir: &Path,
    entries: Vec<PathBuf>,
    base_name: &str,
) -> Option<SubmissionRecord> {
    let mut best: Option<(Language, String)> = None;
    let mut subdirs = Vec::new();

    for path in entries {
        if fs.is_dir(&path) {
            subdirs.push(path);
            continue;
        }
        if let Some((language, ext)) = candidate_language(&path, base_name) {
            if best.as_ref().is_none_or(|(current, _)| language < *current) {
                best = Some((language, ext));
            }
        }
    }

    if let Some((language, extension)) = best {
        debug!(dir = ?dir, %language, "located submission source");
        return Some(SubmissionRecord {
            dir: dir.to_path_buf(),
            extension,
            language,
        });
    }

    subdirs
        .iter()
        .find_map(|sub| search_dir(fs, sub, base_name))
}

fn candidate_language(path: &Path, base_name: &str) -> Option<(Language, String)> {
    let stem = path.file_stem().and_then(|s| s.to_str())?;
    if stem != base_name {
        return None;
    }
    let ext = path.extension().and_then(|e| e.to_str())?;
    Language::from_extension(ext).map(|lang| (lang, ext.to_string()))
}
