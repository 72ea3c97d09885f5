//! Blueprint tool
//!
//! Inspect stored schematic files and blueprint directories.

use blueprint::codec::{decode_schematic, digest_hex, is_compressed, schematic_digest};
use blueprint::{material_list, BlueprintConfig, DirectoryBackend, Material, SchematicStore};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "blueprint-tool")]
#[command(author, version, about = "Inspect blueprint schematic files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a JSON summary of one schematic file
    Inspect {
        /// Schematic file (raw or compressed)
        file: PathBuf,
    },

    /// List the schematics stored under a blueprint directory
    List {
        /// Root of the blueprint directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Namespace to list; defaults to the config's
        #[arg(short, long)]
        namespace: Option<String>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the materials needed to build a schematic
    Materials {
        /// Schematic file (raw or compressed)
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct Summary {
    size: [u32; 3],
    offset: [i32; 3],
    data_version: Option<u32>,
    blocks: usize,
    block_entities: usize,
    compressed: bool,
    bytes: usize,
    digest: String,
    materials: Vec<Material>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file } => inspect(&file)?,
        Commands::List {
            dir,
            namespace,
            config,
        } => list(&dir, namespace, config.as_deref())?,
        Commands::Materials { file } => materials(&file)?,
    }

    Ok(())
}

fn inspect(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(file)?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), file.display());
    let schematic = decode_schematic(&bytes)?;
    let size = schematic.size();
    let offset = schematic.offset();

    let summary = Summary {
        size: [size.width, size.height, size.length],
        offset: [offset.x, offset.y, offset.z],
        data_version: schematic.data_version(),
        blocks: schematic.len(),
        block_entities: schematic.entries().iter().filter(|e| e.has_metadata()).count(),
        compressed: is_compressed(&bytes),
        bytes: bytes.len(),
        digest: digest_hex(&schematic_digest(&schematic)?),
        materials: material_list(&schematic),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn list(
    dir: &Path,
    namespace: Option<String>,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => BlueprintConfig::load(path)?,
        None => BlueprintConfig::default(),
    };
    let namespace = namespace.unwrap_or_else(|| config.namespace.clone());

    let gate = config.data_version_gate();
    let store = SchematicStore::open_gated(DirectoryBackend::new(dir), &namespace, None, gate)?;
    for error in store.load_errors() {
        tracing::warn!("Unreadable entry: {}", error);
    }
    for id in store.list() {
        if let Some(schematic) = store.get(&id) {
            let size = schematic.size();
            println!(
                "{}\t{}x{}x{}\t{} blocks",
                id,
                size.width,
                size.height,
                size.length,
                schematic.len()
            );
        }
    }
    Ok(())
}

fn materials(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(file)?;
    let schematic = decode_schematic(&bytes)?;
    for material in material_list(&schematic) {
        println!("{:>6}  {}", material.count, material.name);
    }
    Ok(())
}
