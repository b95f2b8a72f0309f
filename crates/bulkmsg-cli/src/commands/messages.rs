use crate::commands::{print_json, print_send_output, Context, SendOutput, TableSource};
use crate::error::not_found;
use anyhow::{Context as _, Result};
use bulkmsg_core::{
    ByteContent, EngineError, EngineRequest, EngineResponse, GeneratedBatch, TemplateEngine,
    TemplateSource,
};
use bulkmsg_delivery::{dispatch, Attachment};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub table: TableSource,
    /// Template text; overrides the template sheet
    #[arg(long)]
    pub template: Option<String>,
    #[arg(long)]
    pub sender: Option<String>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub table: TableSource,
    /// Template text; overrides the template sheet
    #[arg(long)]
    pub template: Option<String>,
    #[arg(long)]
    pub sender: Option<String>,
    /// JPEG image to attach; every message becomes MMS
    #[arg(long)]
    pub image: Option<PathBuf>,
    /// Log the batch instead of calling the delivery API
    #[arg(long)]
    pub dry_run: bool,
}

pub fn preview(ctx: &Context<'_>, args: PreviewArgs) -> Result<()> {
    let content = args.table.load(ctx)?;
    let request = EngineRequest {
        template: args.template,
        sender: ctx.sender(args.sender.as_deref())?,
        image_id: None,
        preview_only: true,
    };
    let batch = generate(ctx, &ctx.engine(), &content, &request)?;

    if ctx.json {
        return print_json(&batch.into_response());
    }

    let source = match &batch.template.source {
        TemplateSource::Literal => "--template".to_string(),
        TemplateSource::Cell { sheet } => format!("sheet {sheet}"),
        TemplateSource::Default => "built-in default".to_string(),
    };
    println!("data sheet: {}", batch.data_sheet);
    println!("template ({source}): {}", batch.template.text);
    for entry in &batch.preview {
        match &entry.name {
            Some(name) => println!("\n[{}] {} ({name})", entry.index, entry.phone),
            None => println!("\n[{}] {}", entry.index, entry.phone),
        }
        println!("{}", entry.text);
    }
    println!("\n{}", batch.summary());
    Ok(())
}

/// Generates before uploading so a bad table never costs an image upload,
/// then generates again with the provider's image id.
pub fn send(ctx: &Context<'_>, args: SendArgs) -> Result<()> {
    let attachment = match &args.image {
        Some(path) => {
            if !path.exists() {
                return Err(not_found(format!("image {}", path.display())));
            }
            Some(
                Attachment::from_path(path)
                    .with_context(|| format!("load image {}", path.display()))?,
            )
        }
        None => None,
    };

    let content = args.table.load(ctx)?;
    let engine = ctx.engine();
    let mut request = EngineRequest {
        template: args.template,
        sender: ctx.sender(args.sender.as_deref())?,
        image_id: None,
        preview_only: false,
    };
    let mut batch = generate(ctx, &engine, &content, &request)?;

    let sender = ctx.message_sender(args.dry_run)?;
    if let Some(attachment) = &attachment {
        let image_id = sender
            .upload_image(attachment)
            .with_context(|| format!("upload image {}", attachment.filename()))?;
        info!(image_id = %image_id, "image uploaded");
        request.image_id = Some(image_id);
        batch = generate(ctx, &engine, &content, &request)?;
    }

    let report = dispatch(sender.as_ref(), &batch.recipients)
        .with_context(|| format!("send {} messages", batch.recipients.len()))?;
    info!(
        provider = sender.provider_name(),
        total = report.total,
        failed = report.failed_count,
        "batch dispatched"
    );
    print_send_output(ctx, &SendOutput::from_report(sender.provider_name(), &report))
}

/// Engine failures still print the structured response in JSON mode.
fn generate(
    ctx: &Context<'_>,
    engine: &TemplateEngine,
    content: &ByteContent,
    request: &EngineRequest,
) -> Result<GeneratedBatch> {
    engine
        .generate(content, request)
        .or_else(|err: EngineError| {
            if ctx.json {
                print_json(&EngineResponse::failure(err.to_string()))?;
            }
            Err(err.into())
        })
}
