use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use bulkmsg_delivery::ObjectStore;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Keep tables and images in local object storage.
#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// Save a file and print its key
    Put(PutArgs),
    /// Write a stored object to a file
    Get(GetArgs),
}

#[derive(Debug, Args)]
pub struct PutArgs {
    pub file: PathBuf,
    /// Store under this key instead of a generated one
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    pub key: String,
    #[arg(long)]
    pub out: PathBuf,
    /// Replace `--out` if it already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct StoredObject {
    key: String,
    path: String,
    size_bytes: usize,
}

pub fn put(ctx: &Context<'_>, args: PutArgs) -> Result<()> {
    let data = fs::read(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    let store = ctx.object_store()?;
    let key = match args.key {
        Some(key) => {
            store
                .put_at(&key, &data)
                .with_context(|| format!("store object {key}"))?;
            key
        }
        None => {
            let filename = args
                .file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
            store
                .put(&data, filename.as_deref())
                .with_context(|| format!("store {}", args.file.display()))?
        }
    };

    if ctx.json {
        return print_json(&StoredObject {
            key,
            path: args.file.display().to_string(),
            size_bytes: data.len(),
        });
    }
    println!("{key}");
    Ok(())
}

pub fn get(ctx: &Context<'_>, args: GetArgs) -> Result<()> {
    if args.out.exists() && !args.force {
        return Err(invalid_input(format!(
            "{} already exists; pass --force to replace it",
            args.out.display()
        )));
    }
    let data = ctx
        .object_store()?
        .get(&args.key)
        .with_context(|| format!("load object {}", args.key))?;
    fs::write(&args.out, &data).with_context(|| format!("write {}", args.out.display()))?;

    if ctx.json {
        return print_json(&StoredObject {
            key: args.key,
            path: args.out.display().to_string(),
            size_bytes: data.len(),
        });
    }
    println!("Wrote {} bytes to {}", data.len(), args.out.display());
    Ok(())
}
