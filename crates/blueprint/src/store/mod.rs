//! Schematic store: unique ids, persistence and lookup.
//!
//! The registry is mutated through `&mut self` only; a host that shares a
//! store across threads wraps it in a single mutex.

pub mod backend;
pub mod naming;

use std::collections::{BTreeMap, BTreeSet};

use crate::codec::{
    decode_schematic, decode_schematic_gated, digest_hex, encode_schematic,
    encode_schematic_compressed, schematic_digest, DataVersionGate,
};
use crate::error::StoreError;
use crate::model::{Schematic, SchematicId};

pub use backend::{DirectoryBackend, MemoryBackend, SchematicBackend, FILE_EXTENSION};
pub use naming::{next_unused_name, normalize_name, MAX_STEM_LEN};

/// Name used when a proposed name normalizes to nothing.
pub const FALLBACK_NAME: &str = "blueprint";

/// Registry of saved schematics over a byte backend.
#[derive(Debug)]
pub struct SchematicStore<B> {
    backend: B,
    namespace: String,
    compression_level: Option<i32>,
    default_name: String,
    schematics: BTreeMap<SchematicId, Schematic>,
    /// Every path the backend held at open, loadable or not.
    stored_paths: BTreeSet<String>,
    load_errors: Vec<StoreError>,
}

impl<B: SchematicBackend> SchematicStore<B> {
    /// Opens a store, loading every schematic the backend holds for `namespace`.
    ///
    /// Stored entries that fail to decode are logged and skipped, but their
    /// names stay taken so a later save never replaces them. With a
    /// compression level, new saves are zstd-compressed; reading accepts both.
    pub fn open(
        backend: B,
        namespace: &str,
        compression_level: Option<i32>,
    ) -> Result<Self, StoreError> {
        Self::open_gated(backend, namespace, compression_level, None)
    }

    /// Like [`open`](Self::open), also skipping entries whose data version
    /// falls outside `gate`.
    pub fn open_gated(
        backend: B,
        namespace: &str,
        compression_level: Option<i32>,
        gate: Option<DataVersionGate>,
    ) -> Result<Self, StoreError> {
        // Validates the namespace up front
        let probe = SchematicId::new(namespace, FALLBACK_NAME)?;

        let stored = backend
            .load_all(namespace)
            .map_err(|source| StoreError::LoadFailed {
                namespace: namespace.to_string(),
                source,
            })?;

        let mut schematics = BTreeMap::new();
        let mut stored_paths = BTreeSet::new();
        let mut load_errors = Vec::new();
        for (path, bytes) in stored {
            stored_paths.insert(path.clone());
            let id = match probe.with_path(&path) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Skipping stored schematic with bad name {:?}: {}", path, e);
                    load_errors.push(e);
                    continue;
                }
            };
            let decoded = match &gate {
                Some(gate) => decode_schematic_gated(&bytes, gate),
                None => decode_schematic(&bytes),
            };
            match decoded {
                Ok(schematic) => {
                    schematics.insert(id, schematic);
                }
                Err(source) => {
                    tracing::warn!(
                        "Skipping undecodable schematic {} ({}): {}",
                        id,
                        source.kind().name(),
                        source
                    );
                    load_errors.push(StoreError::Decode { id, source });
                }
            }
        }

        tracing::info!(
            "Loaded {} schematics for namespace {} ({} skipped)",
            schematics.len(),
            namespace,
            load_errors.len()
        );

        Ok(Self {
            backend,
            namespace: namespace.to_string(),
            compression_level,
            default_name: FALLBACK_NAME.to_string(),
            schematics,
            stored_paths,
            load_errors,
        })
    }

    /// Sets the name used when a proposed name normalizes to nothing.
    pub fn with_default_name(mut self, name: &str) -> Self {
        if let Some(normalized) = normalize_name(name) {
            self.default_name = normalized;
        }
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Why each skipped entry could not be loaded at open.
    pub fn load_errors(&self) -> &[StoreError] {
        &self.load_errors
    }

    fn is_taken(&self, path: &str) -> bool {
        if self.stored_paths.contains(path) {
            return true;
        }
        SchematicId::new(&self.namespace, path)
            .map(|id| self.schematics.contains_key(&id))
            .unwrap_or(true)
    }

    /// Returns the id `save` would assign to `proposed_name` right now.
    pub fn next_unused_id(&self, proposed_name: &str) -> Result<SchematicId, StoreError> {
        let normalized = normalize_name(proposed_name).unwrap_or_else(|| self.default_name.clone());
        let path = next_unused_name(&normalized, |candidate| self.is_taken(candidate))?;
        SchematicId::new(&self.namespace, &path)
    }

    /// Saves a schematic under a fresh id derived from `proposed_name`.
    ///
    /// Never overwrites: every call allocates an id no other schematic in
    /// this store has. The schematic is visible to `get`/`list` as soon as
    /// this returns.
    pub fn save(
        &mut self,
        schematic: &Schematic,
        proposed_name: &str,
    ) -> Result<SchematicId, StoreError> {
        let id = self.next_unused_id(proposed_name)?;

        let encoded = match self.compression_level {
            Some(level) => encode_schematic_compressed(schematic, level),
            None => encode_schematic(schematic),
        }
        .map_err(|source| StoreError::Encode {
            id: id.clone(),
            source,
        })?;

        if let Err(source) = self.backend.write(&id, &encoded) {
            tracing::error!("Failed to save schematic {}: {}", id, source);
            return Err(StoreError::Io { id, source });
        }

        match schematic_digest(schematic) {
            Ok(digest) => tracing::info!(
                "Saved schematic {} ({} blocks, {} bytes, digest {})",
                id,
                schematic.len(),
                encoded.len(),
                digest_hex(&digest)
            ),
            Err(_) => tracing::info!("Saved schematic {} ({} bytes)", id, encoded.len()),
        }

        self.stored_paths.insert(id.path().to_string());
        self.schematics.insert(id.clone(), schematic.clone());
        Ok(id)
    }

    /// Looks up a schematic by id.
    pub fn get(&self, id: &SchematicId) -> Option<&Schematic> {
        self.schematics.get(id)
    }

    pub fn contains(&self, id: &SchematicId) -> bool {
        self.schematics.contains_key(id)
    }

    /// All ids in ascending order.
    pub fn list(&self) -> Vec<SchematicId> {
        self.schematics.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.schematics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schematics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;
    use crate::model::{BlockEntry, BlockPos, BlockTypeId, SchematicBuilder};
    use std::io;

    fn sample() -> Schematic {
        SchematicBuilder::new((3, 2, 3))
            .offset(BlockPos::new(-1, 0, -1))
            .block((0, 0, 0), "stone")
            .block_with_metadata((1, 1, 1), "chest", b"items".to_vec())
            .build()
            .unwrap()
    }

    fn memory_store() -> SchematicStore<MemoryBackend> {
        SchematicStore::open(MemoryBackend::new(), "blueprints", Some(3)).unwrap()
    }

    #[test]
    fn test_save_then_get() {
        let mut store = memory_store();
        let schematic = sample();

        let id = store.save(&schematic, "Tower").unwrap();
        assert_eq!(id.to_string(), "blueprints:tower");
        assert!(store.get(&id).unwrap().same_content(&schematic));
        assert_eq!(store.list(), vec![id]);
    }

    #[test]
    fn test_saves_never_overwrite() {
        let mut store = memory_store();
        let a = store.save(&sample(), "foo").unwrap();
        let b = store.save(&sample(), "foo").unwrap();
        let c = store.save(&sample(), "foo").unwrap();
        let d = store.save(&sample(), "Foo!").unwrap();

        let paths: Vec<_> = [&a, &b, &c, &d].iter().map(|id| id.path().to_string()).collect();
        assert_eq!(paths, ["foo", "foo_1", "foo_2", "foo_"]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_empty_name_uses_default() {
        let mut store = memory_store().with_default_name("Untitled");
        let id = store.save(&sample(), "").unwrap();
        assert_eq!(id.path(), "untitled");
    }

    #[test]
    fn test_reopen_reads_saved_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let schematic = sample();

        let id = {
            let mut store =
                SchematicStore::open(DirectoryBackend::new(dir.path()), "blueprints", Some(3)).unwrap();
            store.save(&schematic, "house").unwrap()
        };
        // Raw and compressed files load alike
        let raw_id = {
            let mut store =
                SchematicStore::open(DirectoryBackend::new(dir.path()), "blueprints", None).unwrap();
            store.save(&schematic, "house").unwrap()
        };
        assert_eq!(raw_id.path(), "house_1");

        let store = SchematicStore::open(DirectoryBackend::new(dir.path()), "blueprints", None).unwrap();
        assert_eq!(store.list(), vec![id.clone(), raw_id.clone()]);
        assert!(store.get(&id).unwrap().same_content(&schematic));
        assert!(store.get(&raw_id).unwrap().same_content(&schematic));
    }

    #[test]
    fn test_open_skips_corrupt_entries() {
        let mut backend = MemoryBackend::new();
        let good = SchematicId::new("blueprints", "good").unwrap();
        backend.write(&good, &encode_schematic(&sample()).unwrap()).unwrap();
        backend
            .write(&SchematicId::new("blueprints", "bad").unwrap(), b"\xff\xff\xff\xff")
            .unwrap();

        let store = SchematicStore::open(backend, "blueprints", None).unwrap();
        assert_eq!(store.list(), vec![good]);
        assert!(matches!(
            store.load_errors(),
            [StoreError::Decode { id, .. }] if id.path() == "bad"
        ));
    }

    #[test]
    fn test_unreadable_file_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let ns = dir.path().join("blueprints");
        std::fs::create_dir_all(&ns).unwrap();
        let file = ns.join("house.blueprint");
        std::fs::write(&file, b"precious-but-unreadable").unwrap();

        let mut store =
            SchematicStore::open(DirectoryBackend::new(dir.path()), "blueprints", None).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.load_errors().len(), 1);

        let id = store.save(&sample(), "house").unwrap();
        assert_eq!(id.path(), "house_1");
        assert_eq!(std::fs::read(&file).unwrap(), b"precious-but-unreadable");
    }

    #[test]
    fn test_long_name_fits_file_name_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            SchematicStore::open(DirectoryBackend::new(dir.path()), "blueprints", None).unwrap();

        let long = "a".repeat(300);
        let first = store.save(&sample(), &long).unwrap();
        let second = store.save(&sample(), &long).unwrap();
        assert_eq!(first.path().len(), MAX_STEM_LEN);
        assert_eq!(second.path().len(), MAX_STEM_LEN);
        assert!(second.path().ends_with("_1"));

        let store =
            SchematicStore::open(DirectoryBackend::new(dir.path()), "blueprints", None).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains(&first) && store.contains(&second));
    }

    #[test]
    fn test_unencodable_schematic_is_not_registered() {
        let mut store = memory_store();
        let sign = BlockTypeId::new("oak_sign").with_property("text", "hello, world");
        let schematic = SchematicBuilder::new((1, 1, 1))
            .entry(BlockEntry::new(BlockPos::ORIGIN, sign))
            .build()
            .unwrap();

        let err = store.save(&schematic, "sign").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Encode { source: EncodeError::UnrepresentableDescriptor { .. }, .. }
        ));
        assert!(store.is_empty());
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_open_gated_skips_future_data() {
        let mut backend = MemoryBackend::new();
        let current = SchematicId::new("blueprints", "current").unwrap();
        let future = SchematicId::new("blueprints", "future").unwrap();
        let encode = |v| encode_schematic(&sample().with_data_version(v)).unwrap();
        backend.write(&current, &encode(100)).unwrap();
        backend.write(&future, &encode(200)).unwrap();

        let gate = DataVersionGate::new(150, 0);
        let mut store = SchematicStore::open_gated(backend, "blueprints", None, Some(gate)).unwrap();
        assert_eq!(store.list(), vec![current]);
        assert!(matches!(
            store.load_errors(),
            [StoreError::Decode { id, source }]
                if *id == future && source.kind() == crate::error::ErrorKind::UnsupportedVersion
        ));

        // Still taken
        assert_eq!(store.save(&sample(), "future").unwrap().path(), "future_1");
    }

    #[test]
    fn test_invalid_namespace() {
        let result = SchematicStore::open(MemoryBackend::new(), "Bad Namespace", None);
        assert!(matches!(result, Err(StoreError::InvalidId(_))));
    }

    struct FailingBackend;

    impl SchematicBackend for FailingBackend {
        fn load_all(&self, _namespace: &str) -> io::Result<Vec<(String, Vec<u8>)>> {
            Ok(Vec::new())
        }

        fn write(&mut self, _id: &SchematicId, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"))
        }
    }

    #[test]
    fn test_write_failure_is_reported_and_not_registered() {
        let mut store = SchematicStore::open(FailingBackend, "blueprints", None).unwrap();
        let err = store.save(&sample(), "tower").unwrap_err();
        match err {
            StoreError::Io { id, source } => {
                assert_eq!(id.path(), "tower");
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.is_empty());
    }
}
