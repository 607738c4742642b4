//! List and open world/map resources from a registry manifest.
//!
//! Usage:
//!   mapshelf list --type world --prefix Game
//!   mapshelf list --type world --json
//!   mapshelf open --type world --id Game/Maps/Frontline
//!
//! `list` always exits 0 unless the query itself errors; an empty result is
//! reported on stderr, not as a failure. `open` exits 1 with the failure
//! kind on stderr for any launch failure.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mapshelf::{
    CatalogEntry, CatalogIndex, CatalogOptions, Launcher, LogicalId, ManifestHost, ResourceType,
    find_manifest,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "mapshelf")]
#[command(about = "Catalog and launcher for world/map resources")]
struct Cli {
    /// Registry manifest; discovered via MAPSHELF_MANIFEST or an upward
    /// search when omitted.
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Enumerate resources of a type under a logical-path prefix.
    List {
        /// Resource type tag declared in the manifest.
        #[arg(long = "type")]
        kind: String,
        /// Logical-path prefix; every manifest root when omitted.
        #[arg(long)]
        prefix: Option<String>,
        /// Match the exact type tag only, skipping derived types.
        #[arg(long)]
        exact_type: bool,
        /// Emit NDJSON entries instead of the human listing.
        #[arg(long)]
        json: bool,
    },
    /// Resolve and open a single resource.
    Open {
        /// Resource type tag declared in the manifest.
        #[arg(long = "type")]
        kind: String,
        /// Logical id of the resource to open.
        #[arg(long)]
        id: String,
        /// Match the exact type tag only, skipping derived types.
        #[arg(long)]
        exact_type: bool,
    },
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let manifest_path = match &cli.manifest {
        Some(path) => path.clone(),
        None => find_manifest()?,
    };
    let host = Arc::new(
        ManifestHost::load(&manifest_path)
            .with_context(|| format!("loading manifest {}", manifest_path.display()))?,
    );

    match cli.command {
        CliCommand::List {
            kind,
            prefix,
            exact_type,
            json,
        } => run_list(host, &kind, prefix.as_deref(), exact_type, json),
        CliCommand::Open {
            kind,
            id,
            exact_type,
        } => run_open(host, &kind, &id, exact_type),
    }
}

fn catalog_for(host: &Arc<ManifestHost>, kind: &str, exact_type: bool) -> Result<(ResourceType, CatalogIndex)> {
    let kind = ResourceType::new(kind);
    let Some(extension) = host.extension_for(&kind) else {
        bail!("unknown resource type '{kind}'; declare it in the manifest types table");
    };
    let mut options = CatalogOptions::new(extension);
    if exact_type {
        options = options.exact_type();
    }
    let index = CatalogIndex::new(Arc::clone(host) as Arc<dyn mapshelf::HostEnvironment>, options);
    Ok((kind, index))
}

fn run_list(
    host: Arc<ManifestHost>,
    kind: &str,
    prefix: Option<&str>,
    exact_type: bool,
    json: bool,
) -> Result<()> {
    let (kind, index) = catalog_for(&host, kind, exact_type)?;

    let prefixes: Vec<LogicalId> = match prefix {
        Some(prefix) => vec![LogicalId::new(prefix)],
        None => host
            .manifest()
            .roots
            .keys()
            .map(|root| LogicalId::new(root.clone()))
            .collect(),
    };

    let mut total = 0usize;
    for prefix in &prefixes {
        for entry in index.snapshot(&kind, prefix) {
            total += 1;
            if json {
                println!("{}", entry_json(&entry));
            } else {
                print_entry(&entry);
            }
        }
    }

    if total == 0 {
        eprintln!("mapshelf: no resources found");
    }
    Ok(())
}

fn print_entry(entry: &CatalogEntry) {
    match &entry.resolved_path {
        Ok(path) => println!("{}\t{}", entry.id, path),
        Err(err) => println!("{}\t[not launchable: {err}]", entry.id),
    }
}

fn entry_json(entry: &CatalogEntry) -> String {
    let value = match &entry.resolved_path {
        Ok(path) => json!({
            "id": entry.id.as_str(),
            "display_name": entry.display_name,
            "launchable": true,
            "path": path.as_path().display().to_string(),
        }),
        Err(err) => json!({
            "id": entry.id.as_str(),
            "display_name": entry.display_name,
            "launchable": false,
            "error": err.to_string(),
        }),
    };
    value.to_string()
}

fn run_open(host: Arc<ManifestHost>, kind: &str, id: &str, exact_type: bool) -> Result<()> {
    let (kind, index) = catalog_for(&host, kind, exact_type)?;
    let id = LogicalId::new(id);

    // Longest matching root wins so nested roots resolve against the most
    // specific base directory.
    let mut roots: Vec<&String> = host.manifest().roots.keys().collect();
    roots.sort_by_key(|root| std::cmp::Reverse(root.len()));
    let Some(root) = roots
        .into_iter()
        .map(|root| LogicalId::new(root.clone()))
        .find(|root| id.starts_with_ignore_case(root))
    else {
        bail!("id '{id}' is not under any manifest root");
    };

    let snapshot = index.snapshot(&kind, &root);
    let Some(entry) = snapshot.iter().find(|entry| entry.id.eq_ignore_case(&id)) else {
        bail!("resource '{id}' of type '{kind}' is not in the catalog");
    };

    let launcher = Launcher::new(Arc::clone(&host) as Arc<dyn mapshelf::HostEnvironment>);
    let receipt = launcher.launch(entry)?;
    println!("opened {} ({})", receipt.id, receipt.path);
    Ok(())
}
