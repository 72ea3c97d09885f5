//! Byte storage behind the schematic store.
//!
//! Backends only move bytes; encoding, naming and the registry live in
//! [`SchematicStore`](super::SchematicStore).

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::SchematicId;

/// File extension of stored schematics.
pub const FILE_EXTENSION: &str = "blueprint";

/// Durable storage for encoded schematics.
///
/// Calls block the caller's thread.
pub trait SchematicBackend {
    /// Returns every stored `(path, bytes)` pair of a namespace.
    fn load_all(&self, namespace: &str) -> io::Result<Vec<(String, Vec<u8>)>>;

    /// Stores the bytes of one schematic, replacing any previous content.
    fn write(&mut self, id: &SchematicId, bytes: &[u8]) -> io::Result<()>;
}

impl<B: SchematicBackend + ?Sized> SchematicBackend for Box<B> {
    fn load_all(&self, namespace: &str) -> io::Result<Vec<(String, Vec<u8>)>> {
        (**self).load_all(namespace)
    }

    fn write(&mut self, id: &SchematicId, bytes: &[u8]) -> io::Result<()> {
        (**self).write(id, bytes)
    }
}

/// Backend holding everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    files: BTreeMap<SchematicId, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored bytes of one schematic.
    pub fn get(&self, id: &SchematicId) -> Option<&[u8]> {
        self.files.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SchematicBackend for MemoryBackend {
    fn load_all(&self, namespace: &str) -> io::Result<Vec<(String, Vec<u8>)>> {
        Ok(self
            .files
            .iter()
            .filter(|(id, _)| id.namespace() == namespace)
            .map(|(id, bytes)| (id.path().to_string(), bytes.clone()))
            .collect())
    }

    fn write(&mut self, id: &SchematicId, bytes: &[u8]) -> io::Result<()> {
        self.files.insert(id.clone(), bytes.to_vec());
        Ok(())
    }
}

/// Backend storing one file per schematic under
/// `<root>/<namespace>/<path>.blueprint`.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds a schematic.
    pub fn file_path(&self, id: &SchematicId) -> PathBuf {
        let mut path = self.root.join(id.namespace());
        path.extend(id.path().split('/'));
        // Appended rather than set: names may already contain dots
        let mut file = path.into_os_string();
        file.push(".");
        file.push(FILE_EXTENSION);
        PathBuf::from(file)
    }
}

impl SchematicBackend for DirectoryBackend {
    fn load_all(&self, namespace: &str) -> io::Result<Vec<(String, Vec<u8>)>> {
        let dir = self.root.join(namespace);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        collect_files(&dir, "", &mut out)?;
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn write(&mut self, id: &SchematicId, bytes: &[u8]) -> io::Result<()> {
        let path = self.file_path(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write beside the target and rename so a crash never leaves half a file
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)
    }
}

fn collect_files(dir: &Path, prefix: &str, out: &mut Vec<(String, Vec<u8>)>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if entry.file_type()?.is_dir() {
            collect_files(&path, &format!("{prefix}{name}/"), out)?;
            continue;
        }

        let Some(stem) = name.strip_suffix(FILE_EXTENSION).and_then(|s| s.strip_suffix('.')) else {
            tracing::warn!("Skipping unexpected file in blueprint dir: {}", path.display());
            continue;
        };
        out.push((format!("{prefix}{stem}"), fs::read(&path)?));
    }
    Ok(())
}
