use crate::commands::{print_json, print_send_output, Context, SendOutput};
use crate::error::{invalid_input, not_found};
use anyhow::{Context as _, Result};
use bulkmsg_core::{
    compose_direct_messages, parse_recipient_csv, parse_recipient_list, DirectMessage,
    RecipientList,
};
use bulkmsg_delivery::{dispatch, Attachment};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Args)]
pub struct SendTextArgs {
    #[arg(long)]
    pub text: String,
    /// Phone numbers separated by newlines or commas
    #[arg(long, required_unless_present = "file", conflicts_with = "file")]
    pub to: Option<String>,
    /// CSV with names in column A and phone numbers in column B
    #[arg(long)]
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub sender: Option<String>,
    #[arg(long)]
    pub subject: Option<String>,
    /// JPEG image to attach
    #[arg(long)]
    pub image: Option<PathBuf>,
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ParseRecipientsArgs {
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct ParsedRecipients {
    success: bool,
    recipients: Vec<String>,
    names: Vec<String>,
    count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    invalid: Vec<String>,
}

impl From<RecipientList> for ParsedRecipients {
    fn from(list: RecipientList) -> Self {
        let count = list.count();
        Self {
            success: true,
            recipients: list.recipients,
            names: list.names,
            count,
            invalid: list.invalid,
        }
    }
}

pub fn parse_recipients(ctx: &Context<'_>, args: ParseRecipientsArgs) -> Result<()> {
    let list = read_recipient_csv(&args.file)?;
    if ctx.json {
        return print_json(&ParsedRecipients::from(list));
    }

    for (index, phone) in list.recipients.iter().enumerate() {
        match list.names.get(index).filter(|name| !name.is_empty()) {
            Some(name) => println!("{phone}\t{name}"),
            None => println!("{phone}"),
        }
    }
    for entry in &list.invalid {
        println!("skipped: {entry}");
    }
    println!("{} recipients", list.count());
    Ok(())
}

pub fn send_text(ctx: &Context<'_>, args: SendTextArgs) -> Result<()> {
    if args.text.trim().is_empty() {
        return Err(invalid_input("message text is empty"));
    }
    let sender_number = ctx.sender(args.sender.as_deref())?;

    let list = match (&args.to, &args.file) {
        (Some(raw), _) => parse_recipient_list(raw),
        (None, Some(path)) => read_recipient_csv(path)?,
        (None, None) => return Err(invalid_input("pass --to or --file")),
    };
    if !list.invalid.is_empty() {
        warn!(count = list.invalid.len(), "skipping invalid phone numbers");
    }
    if list.is_empty() {
        return Err(invalid_input("no valid phone numbers"));
    }

    let attachment = match &args.image {
        Some(path) if !path.exists() => {
            return Err(not_found(format!("image {}", path.display())));
        }
        Some(path) => Some(
            Attachment::from_path(path)
                .with_context(|| format!("load image {}", path.display()))?,
        ),
        None => None,
    };

    let sender = ctx.message_sender(args.dry_run)?;
    let image_id = match &attachment {
        Some(attachment) => Some(
            sender
                .upload_image(attachment)
                .with_context(|| format!("upload image {}", attachment.filename()))?,
        ),
        None => None,
    };

    let message = DirectMessage {
        text: args.text,
        sender: sender_number,
        image_id,
        subject: args.subject.or_else(|| ctx.config.delivery.subject.clone()),
        lms_threshold: ctx.config.lms_threshold,
    };
    let records = compose_direct_messages(&list.recipients, &message);
    let report = dispatch(sender.as_ref(), &records)
        .with_context(|| format!("send {} messages", records.len()))?;
    info!(
        provider = sender.provider_name(),
        total = report.total,
        failed = report.failed_count,
        "direct batch dispatched"
    );
    print_send_output(ctx, &SendOutput::from_report(sender.provider_name(), &report))
}

fn read_recipient_csv(path: &Path) -> Result<RecipientList> {
    if !path.exists() {
        return Err(not_found(format!("recipient file {}", path.display())));
    }
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let list =
        parse_recipient_csv(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(list)
}
