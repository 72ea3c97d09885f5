//! Module state built once at startup.
//!
//! [`ModuleRegistry`] owns the configuration, the block sets derived from it
//! and the schematic store. Hosts construct one and pass it to every table
//! and projector interaction.

use crate::config::BlueprintConfig;
use crate::error::{StoreError, TableError};
use crate::model::{BlockPos, Direction, Schematic, SchematicId};
use crate::outline::detect_outline;
use crate::projector::Projector;
use crate::store::{SchematicBackend, SchematicStore};
use crate::world::{BlockSet, WorldQuery};

/// Configuration, block sets and store of one blueprint module.
#[derive(Debug)]
pub struct ModuleRegistry<B> {
    config: BlueprintConfig,
    frame_blocks: BlockSet,
    ignored_blocks: BlockSet,
    store: SchematicStore<B>,
}

impl<B: SchematicBackend> ModuleRegistry<B> {
    /// Opens the store on `backend` and derives the block sets from `config`.
    pub fn new(config: BlueprintConfig, backend: B) -> Result<Self, StoreError> {
        let store = SchematicStore::open_gated(
            backend,
            &config.namespace,
            config.compression_level,
            config.data_version_gate(),
        )?
        .with_default_name(&config.default_name);
        Ok(Self {
            frame_blocks: BlockSet::from_names(&config.frame_blocks),
            ignored_blocks: BlockSet::from_names(&config.ignored_blocks),
            config,
            store,
        })
    }

    pub fn config(&self) -> &BlueprintConfig {
        &self.config
    }

    pub fn frame_blocks(&self) -> &BlockSet {
        &self.frame_blocks
    }

    pub fn ignored_blocks(&self) -> &BlockSet {
        &self.ignored_blocks
    }

    pub fn store(&self) -> &SchematicStore<B> {
        &self.store
    }

    /// Captures the structure outlined around the table at `table_pos` and
    /// saves it.
    ///
    /// The name is the player's custom name when given, the configured
    /// default otherwise. Nothing is saved unless a full outline is found.
    pub fn fill_blueprint<W>(
        &mut self,
        world: &W,
        table_pos: BlockPos,
        custom_name: Option<&str>,
    ) -> Result<SchematicId, TableError>
    where
        W: WorldQuery + ?Sized,
    {
        let frame = &self.frame_blocks;
        let outline = detect_outline(table_pos, self.config.max_side_length, |pos| {
            world.is_block_of_frame_type(pos, frame)
        })?
        .ok_or(TableError::InvalidStructure { pos: table_pos })?;

        let mut schematic = Schematic::capture(world, &outline, table_pos, &self.ignored_blocks)?;
        if let Some(version) = self.config.data_version {
            schematic = schematic.with_data_version(version);
        }

        let name = custom_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.config.default_name.as_str());

        match self.store.save(&schematic, name) {
            Ok(id) => Ok(id),
            Err(e) => {
                tracing::error!("Blueprint table at {} failed to save {:?}: {}", table_pos, name, e);
                Err(TableError::SaveFailed(e))
            }
        }
    }

    /// Looks up a stored schematic.
    pub fn get(&self, id: &SchematicId) -> Option<&Schematic> {
        self.store.get(id)
    }

    /// Builds a projector for a stored schematic, or `None` if `id` is unknown.
    pub fn projector_for(
        &self,
        id: &SchematicId,
        anchor: BlockPos,
        facing: Direction,
    ) -> Option<Projector> {
        let Some(schematic) = self.store.get(id) else {
            tracing::warn!("No schematic {} to project", id);
            return None;
        };
        Some(Projector::new(schematic.clone(), anchor, facing))
    }
}
