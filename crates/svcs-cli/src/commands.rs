use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use svcs_crypto::ContentHasher;
use svcs_store::{FsObjectStore, Layout, ObjectStore, StoreConfig};
use svcs_types::{HashAlgorithm, ObjectId};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let root = cli.root.as_path();
    let format = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(root, format, args, &mut out),
        Command::HashObject(args) => cmd_hash_object(root, format, args, &mut out),
        Command::Write(args) => cmd_write(root, format, args, &mut out),
        Command::Cat(args) => cmd_cat(root, args, &mut out),
        Command::Exists(args) => cmd_exists(root, format, args, &mut out),
        Command::Commit(args) => cmd_commit(root, format, args, &mut out),
        Command::List => cmd_list(root, format, &mut out),
        Command::Fsck => cmd_fsck(root, format, &mut out),
    }
}

fn open_store(root: &Path) -> anyhow::Result<FsObjectStore> {
    FsObjectStore::open(root).with_context(|| format!("opening store at {}", root.display()))
}

/// Bytes from `path`, or all of stdin when no path is given.
fn read_input(path: Option<&PathBuf>) -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::new();
    match path {
        Some(path) => {
            File::open(path)
                .and_then(|mut f| f.read_to_end(&mut data))
                .with_context(|| format!("reading {}", path.display()))?;
        }
        None => {
            io::stdin().read_to_end(&mut data).context("reading stdin")?;
        }
    }
    Ok(data)
}

fn print_id(format: OutputFormat, id: &ObjectId, out: &mut impl Write) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{id}")?,
        OutputFormat::Json => writeln!(out, "{}", json!({ "digest": id }))?,
    }
    Ok(())
}

fn cmd_init(
    root: &Path,
    format: OutputFormat,
    args: InitArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let store = if args.algorithm.is_none() && !args.sharded {
        open_store(root)?
    } else {
        let layout = if args.sharded { Layout::Sharded } else { Layout::Flat };
        let config = StoreConfig::with_algorithm(args.algorithm.unwrap_or_default()).layout(layout);
        FsObjectStore::open_with(root, config)
            .with_context(|| format!("initializing store at {}", root.display()))?
    };
    let config = store.config();
    match format {
        OutputFormat::Text => writeln!(
            out,
            "{} Initialized object store in {} ({}, {})",
            "✓".green().bold(),
            root.display().to_string().bold(),
            config.algorithm.to_string().cyan(),
            config.layout,
        )?,
        OutputFormat::Json => writeln!(
            out,
            "{}",
            json!({
                "root": root,
                "algorithm": config.algorithm,
                "layout": config.layout,
            })
        )?,
    }
    Ok(())
}

fn cmd_hash_object(
    root: &Path,
    format: OutputFormat,
    args: HashObjectArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    // Hashing never creates a store; it only borrows an existing one's algorithm.
    let algorithm = match args.algorithm {
        Some(algorithm) => algorithm,
        None => StoreConfig::load(root)?
            .map(|c| c.algorithm)
            .unwrap_or_default(),
    };
    let hasher = ContentHasher::new(algorithm);
    let id = match &args.path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("reading {}", path.display()))?;
            hasher.hash_reader(file)?
        }
        None => hasher.hash_reader(io::stdin().lock())?,
    };
    print_id(format, &id, out)
}

fn cmd_write(
    root: &Path,
    format: OutputFormat,
    args: WriteArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let data = read_input(args.path.as_ref())?;
    let store = open_store(root)?;
    let id = store.write(&data)?;
    print_id(format, &id, out)
}

fn cmd_cat(root: &Path, args: CatArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let data = if args.verify {
        let id = parse_digest(store.config().algorithm, &args.digest)?;
        store.read_verified(&id)?
    } else {
        store.read_hex(&args.digest)?
    };
    out.write_all(&data)?;
    out.flush()?;
    Ok(())
}

fn parse_digest(algorithm: HashAlgorithm, digest: &str) -> anyhow::Result<ObjectId> {
    ObjectId::parse_for(algorithm, digest)
        .map_err(|_| svcs_store::StoreError::ObjectNotFound(digest.to_string()).into())
}

fn cmd_exists(
    root: &Path,
    format: OutputFormat,
    args: ExistsArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let present = store.exists_hex(&args.digest)?;
    match format {
        OutputFormat::Text => writeln!(out, "{present}")?,
        OutputFormat::Json => writeln!(
            out,
            "{}",
            json!({ "digest": args.digest, "exists": present })
        )?,
    }
    Ok(())
}

fn cmd_commit(
    root: &Path,
    format: OutputFormat,
    args: CommitArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let id = store.write(args.message.as_bytes())?;
    tracing::info!(%id, "committed message");
    match format {
        OutputFormat::Text => writeln!(out, "Committed with hash {id}")?,
        OutputFormat::Json => writeln!(
            out,
            "{}",
            json!({ "digest": id, "message": args.message })
        )?,
    }
    Ok(())
}

fn cmd_list(root: &Path, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let ids = store.list()?;
    match format {
        OutputFormat::Text => {
            for id in &ids {
                writeln!(out, "{id}")?;
            }
        }
        OutputFormat::Json => writeln!(out, "{}", json!({ "objects": ids }))?,
    }
    Ok(())
}

fn cmd_fsck(root: &Path, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let report = store.fsck()?;
    match format {
        OutputFormat::Text => {
            if report.is_clean() {
                writeln!(out, "{} {} objects, no issues.", "✓".green().bold(), report.checked)?;
            } else {
                for id in &report.corrupt {
                    writeln!(out, "{} corrupt object {}", "✗".red().bold(), id.to_string().yellow())?;
                }
            }
        }
        OutputFormat::Json => writeln!(
            out,
            "{}",
            json!({ "checked": report.checked, "corrupt": report.corrupt })
        )?,
    }
    if !report.is_clean() {
        anyhow::bail!(
            "{} of {} objects failed verification",
            report.corrupt.len(),
            report.checked
        );
    }
    Ok(())
}
