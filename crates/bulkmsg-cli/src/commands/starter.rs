use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use bulkmsg_core::StarterKind;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StarterArg {
    /// Name and phone number CSV for `send-text --file`
    Bulk,
    /// Workbook with a 자동메시지 template sheet and a data sheet
    Auto,
}

impl From<StarterArg> for StarterKind {
    fn from(arg: StarterArg) -> Self {
        match arg {
            StarterArg::Bulk => StarterKind::Bulk,
            StarterArg::Auto => StarterKind::Auto,
        }
    }
}

#[derive(Debug, Args)]
pub struct TemplateArgs {
    #[arg(value_enum)]
    pub kind: StarterArg,
    /// Defaults to the starter file name in the current directory
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Replace `--out` if it already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct WrittenStarter {
    kind: StarterKind,
    path: String,
    size_bytes: usize,
}

pub fn write_starter(ctx: &Context<'_>, args: TemplateArgs) -> Result<()> {
    let kind = StarterKind::from(args.kind);
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(kind.file_name()));
    if out.exists() && !args.force {
        return Err(invalid_input(format!(
            "{} already exists; pass --force to replace it",
            out.display()
        )));
    }

    let data = kind
        .render()
        .with_context(|| format!("render {kind} starter file"))?;
    fs::write(&out, &data).with_context(|| format!("write {}", out.display()))?;
    info!(%kind, path = %out.display(), "starter file written");

    if ctx.json {
        return print_json(&WrittenStarter {
            kind,
            path: out.display().to_string(),
            size_bytes: data.len(),
        });
    }
    println!("Wrote {kind} starter to {}", out.display());
    Ok(())
}
