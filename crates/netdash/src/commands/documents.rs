//! Document command handlers.

use std::sync::Arc;

use indicatif::ProgressBar;
use serde::Serialize;
use tabled::Tabled;

use netdash_core::format::{format_size, format_size_short};
use netdash_core::{
    Document, DocumentDraft, DocumentPatch, DocumentsHook, EntityId, ListParams, Pagination,
    Resource, ResourceStats, UploadOutcome,
};

use crate::cli::{DocumentUpdateArgs, DocumentsArgs, DocumentsCommand, GlobalOpts, UploadArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "File")]
    file_name: String,
    #[tabled(rename = "Type")]
    content_type: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Arc<Document>> for DocumentRow {
    fn from(d: &Arc<Document>) -> Self {
        Self {
            id: d.id.to_string(),
            title: d.title.clone(),
            file_name: d.file_name.clone(),
            content_type: d.content_type.clone(),
            size: format_size_short(d.size),
            category: d.category.clone().unwrap_or_default(),
            created: d.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Per-file result of a batch upload, as printed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadReport {
    file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&UploadOutcome<Document>> for UploadReport {
    fn from(o: &UploadOutcome<Document>) -> Self {
        Self {
            file_name: o.file_name().to_owned(),
            id: o.result.as_ref().ok().map(|d| d.id.to_string()),
            error: o.error().map(ToString::to_string),
        }
    }
}

#[derive(Tabled)]
struct UploadRow {
    #[tabled(rename = "File")]
    file_name: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl From<&UploadReport> for UploadRow {
    fn from(r: &UploadReport) -> Self {
        Self {
            file_name: r.file_name.clone(),
            result: match (&r.id, &r.error) {
                (Some(id), _) => format!("uploaded as {id}"),
                (None, Some(err)) => err.clone(),
                (None, None) => String::new(),
            },
        }
    }
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "Tag")]
    tag: String,
}

fn detail(d: &Arc<Document>) -> String {
    let mut lines = vec![
        format!("ID:          {}", d.id),
        format!("Title:       {}", d.title),
        format!("File:        {}", d.file_name),
        format!("Type:        {}", d.content_type),
        format!("Size:        {}", format_size(d.size)),
        format!("Category:    {}", d.category.as_deref().unwrap_or("-")),
    ];
    if !d.tags.is_empty() {
        lines.push(format!("Tags:        {}", d.tags.join(", ")));
    }
    if let Some(ref description) = d.description {
        lines.push(format!("Description: {description}"));
    }
    lines.push(format!("Created:     {}", d.created_at.to_rfc3339()));
    if let Some(updated) = d.updated_at {
        lines.push(format!("Updated:     {}", updated.to_rfc3339()));
    }
    lines.join("\n")
}

fn stats_detail(stats: &ResourceStats) -> String {
    let mut lines = vec![
        format!("Documents:  {}", stats.total),
        format!("Total size: {}", format_size(stats.total_size)),
    ];
    for (category, count) in &stats.by_category {
        lines.push(format!("  {category}: {count}"));
    }
    lines.join("\n")
}

fn id_of(d: &Arc<Document>) -> String {
    d.id.to_string()
}

fn render_docs(global: &GlobalOpts, docs: &[Arc<Document>]) -> Result<(), CliError> {
    let out = output::render_list(global.output, docs, |d| DocumentRow::from(d), id_of)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_doc(global: &GlobalOpts, doc: &Arc<Document>) -> Result<(), CliError> {
    let out = output::render_single(global.output, doc, detail, id_of)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// "Page 2 of 5 (93 total)" below tables.
pub(super) fn print_page_footer(global: &GlobalOpts, page: &Pagination) {
    if global.quiet || global.output != crate::cli::OutputFormat::Table {
        return;
    }
    eprintln!(
        "Page {} of {} ({} total)",
        page.current_page,
        page.total_pages.max(1),
        page.total_count
    );
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    hook: &DocumentsHook,
    args: DocumentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DocumentsCommand::List(list) => {
            let page = hook.list(util::list_params(&list)).await?;
            render_docs(global, &hook.state().items)?;
            print_page_footer(global, &page);
            Ok(())
        }

        DocumentsCommand::Search { query, page } => {
            let found = hook.search(&query, ListParams::page(page)).await?;
            render_docs(global, &found)
        }

        DocumentsCommand::Get { id } => {
            let entity: EntityId = id.as_str().into();
            let doc = hook
                .get(&entity)
                .await
                .map_err(|e| CliError::from_core(e, "document", &id))?;
            render_doc(global, &doc)
        }

        DocumentsCommand::Upload(upload) => handle_upload(hook, upload, global).await,

        DocumentsCommand::Update(update) => handle_update(hook, update, global).await,

        DocumentsCommand::Delete { id } => {
            let approved = util::confirm(&format!("Delete document {id}?"), global.yes)?;
            let entity: EntityId = id.as_str().into();
            hook.delete_with_confirmation(&entity, Some(move |_: &EntityId| approved))
                .await
                .map_err(|e| CliError::from_core(e, "document", &id))?;
            Ok(())
        }

        DocumentsCommand::Stats(list) => {
            hook.list(util::list_params(&list)).await?;
            let stats = hook.stats();
            let out = output::render_single(global.output, &stats, stats_detail, |s| {
                s.total.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DocumentsCommand::Tags(list) => {
            hook.list(util::list_params(&list)).await?;
            let tags = hook.all_tags();
            let out = output::render_list(
                global.output,
                &tags,
                |t| TagRow { tag: t.clone() },
                Clone::clone,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

async fn handle_upload(
    hook: &DocumentsHook,
    args: UploadArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.title.is_some() && args.files.len() > 1 {
        return Err(CliError::Validation {
            field: "title".into(),
            reason: "--title applies to a single file; batch uploads are titled by file name"
                .into(),
        });
    }

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        files.push(util::read_upload_file(path, args.content_type.as_deref()).await?);
    }

    let base = DocumentDraft {
        title: args.title.unwrap_or_default(),
        description: args.description,
        category: args.category,
        tags: args.tags,
    };

    if files.len() == 1 {
        let Some(file) = files.pop() else {
            return Ok(());
        };
        let draft = Document::draft_for_upload(&base, &file);
        let bar = util::upload_bar(&file.file_name, global.quiet);
        let result = hook
            .upload_with_validation(draft, file, Some(util::progress_into(&bar)))
            .await;
        bar.finish_and_clear();
        return render_doc(global, &result?);
    }

    let bar = util::upload_bar("batch", global.quiet);
    let follower = follow_upload_progress(hook, bar.clone());
    let outcomes = hook.upload_multiple(files, &base).await;
    follower.abort();
    bar.finish_and_clear();

    let reports: Vec<UploadReport> = outcomes.iter().map(UploadReport::from).collect();
    let out = output::render_list(
        global.output,
        &reports,
        |r| UploadRow::from(r),
        |r| r.file_name.clone(),
    )?;
    output::print_output(&out, global.quiet);

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        return Err(CliError::PartialUpload {
            failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}

/// Mirror the slice's upload progress onto `bar` until aborted.
fn follow_upload_progress(hook: &DocumentsHook, bar: ProgressBar) -> tokio::task::JoinHandle<()> {
    let mut stream = hook.subscribe();
    tokio::spawn(async move {
        while let Some(state) = stream.changed().await {
            let upload = &state.upload;
            if upload.in_progress {
                if let Some(ref name) = upload.file_name {
                    bar.set_message(name.clone());
                }
                bar.set_position(u64::from(upload.percent));
            }
        }
    })
}

async fn handle_update(
    hook: &DocumentsHook,
    args: DocumentUpdateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let patch = DocumentPatch {
        title: args.title,
        description: args.description,
        category: args.category,
        tags: args.tags,
    };
    if patch == DocumentPatch::default() {
        return Err(CliError::Validation {
            field: "update".into(),
            reason: "nothing to change; pass --title, --description, --category or --tag".into(),
        });
    }
    let entity: EntityId = args.id.as_str().into();
    let doc = hook
        .update(&entity, patch)
        .await
        .map_err(|e| CliError::from_core(e, "document", &args.id))?;
    render_doc(global, &doc)
}
