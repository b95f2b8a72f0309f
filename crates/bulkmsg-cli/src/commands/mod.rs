use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use bulkmsg_config::{AppConfig, DeliveryProvider};
use bulkmsg_core::{normalize_sender, ByteContent, TableInput, TemplateEngine};
use bulkmsg_delivery::{
    DeliveryReport, DryRunSender, FsObjectStore, MessageSender, ObjectStore, SolapiCredentials,
    SolapiSender,
};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub mod completions;
pub mod direct;
pub mod messages;
pub mod starter;
pub mod store;

pub struct Context<'a> {
    pub json: bool,
    pub config: &'a AppConfig,
}

impl Context<'_> {
    pub fn engine(&self) -> TemplateEngine {
        TemplateEngine::new(self.config.engine_options())
    }

    /// `--sender` wins over the configured default.
    pub fn sender(&self, flag: Option<&str>) -> Result<String> {
        let sender = flag
            .or(self.config.sender.as_deref())
            .map(normalize_sender)
            .filter(|sender| !sender.is_empty());
        sender.ok_or_else(|| {
            invalid_input("sender number is required; pass --sender or set `sender` in config")
        })
    }

    pub fn message_sender(&self, dry_run: bool) -> Result<Box<dyn MessageSender>> {
        let delivery = &self.config.delivery;
        if dry_run || delivery.provider == DeliveryProvider::DryRun {
            return Ok(Box::new(DryRunSender));
        }
        let credentials =
            SolapiCredentials::from_env(&delivery.api_key_env, &delivery.api_secret_env)?;
        let sender = SolapiSender::new(
            &delivery.base_url,
            credentials,
            Duration::from_secs(delivery.timeout_seconds),
        )
        .with_context(|| format!("configure delivery API at {}", delivery.base_url))?;
        Ok(Box::new(sender))
    }

    pub fn object_store(&self) -> Result<FsObjectStore> {
        let store = match &self.config.storage.dir {
            Some(dir) => FsObjectStore::open(dir.clone()),
            None => FsObjectStore::open_default(),
        }
        .with_context(|| "open object storage")?;
        debug!(root = %store.root().display(), "object storage ready");
        Ok(store)
    }
}

/// Where to read the table from: a local file or a stored object key.
#[derive(Debug, Args)]
pub struct TableSource {
    /// CSV or spreadsheet file
    #[arg(required_unless_present = "key")]
    pub file: Option<PathBuf>,
    /// Key of a table previously saved with `store put`
    #[arg(long, conflicts_with = "file")]
    pub key: Option<String>,
}

impl TableSource {
    pub fn load(&self, ctx: &Context<'_>) -> Result<ByteContent> {
        if let Some(key) = &self.key {
            let data = ctx
                .object_store()?
                .get(key)
                .with_context(|| format!("load stored table {key}"))?;
            // Keys are opaque; the format comes from the bytes.
            return Ok(ByteContent::new(data, None));
        }
        let path = self
            .file
            .clone()
            .ok_or_else(|| invalid_input("a table file or --key is required"))?;
        let content = TableInput::Path(path.clone())
            .resolve()
            .with_context(|| format!("read table {}", path.display()))?;
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutput {
    pub success: bool,
    pub provider: &'static str,
    pub total: usize,
    pub failed_count: usize,
    pub failed_list: Vec<FailedEntry>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FailedEntry {
    pub to: String,
    pub reason: String,
}

impl SendOutput {
    pub fn from_report(provider: &'static str, report: &DeliveryReport) -> Self {
        Self {
            success: true,
            provider,
            total: report.total,
            failed_count: report.failed_count,
            failed_list: report
                .failed
                .iter()
                .map(|failed| FailedEntry {
                    to: failed.to.clone(),
                    reason: failed.describe(),
                })
                .collect(),
            message: report.summary(),
        }
    }
}

pub fn print_send_output(ctx: &Context<'_>, output: &SendOutput) -> Result<()> {
    if ctx.json {
        return print_json(output);
    }
    println!("{} (via {})", output.message, output.provider);
    for failed in &output.failed_list {
        println!("  failed {}: {}", failed.to, failed.reason);
    }
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
