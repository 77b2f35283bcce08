// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    Dir(Vec<String>), // List of child names
}

/// In-memory filesystem for locator and batch tests.
///
/// Only the tree shape matters to `labmark`, so files carry no content.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Add an (empty) file, creating parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        entries.insert(path.to_path_buf(), MockEntry::File);
        if let Some(parent) = path.parent() {
            let parent = normalise_parent(parent);
            ensure_dir_entry(&mut entries, parent);
            link_child(&mut entries, parent, path);
        }
    }

    /// Add an empty directory, creating parents implicitly.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        ensure_dir_entry(&mut entries, path.as_ref());
    }
}

fn normalise_parent(parent: &Path) -> &Path {
    if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    }
}

fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent() {
        let parent = normalise_parent(parent);
        if parent != path {
            ensure_dir_entry(entries, parent);
            link_child(entries, parent, path);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MockEntry::File))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                let mut paths: Vec<PathBuf> = children.iter().map(|name| path.join(name)).collect();
                paths.sort();
                Ok(paths)
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(MockEntry::File) = entries.get(path) {
            return Err(anyhow!("Is a file: {:?}", path));
        }
        ensure_dir_entry(&mut entries, path);
        Ok(())
    }
}
