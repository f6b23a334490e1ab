//! Shared helpers for command handlers.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use netdash_api::{ProgressFn, TransferProgress};
use netdash_core::{ListParams, SortDirection, SortingPatch, UploadFile};

use crate::cli::ListArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Turn list flags into call-scoped overrides.
pub fn list_params(args: &ListArgs) -> ListParams {
    let sorting = match (&args.sort, args.asc) {
        (Some(field), asc) => {
            let patch = SortingPatch::field(field.clone());
            if asc {
                patch.direction(SortDirection::Asc)
            } else {
                patch
            }
        }
        (None, true) => SortingPatch::default().direction(SortDirection::Asc),
        (None, false) => SortingPatch::default(),
    };
    ListParams {
        page: Some(args.page),
        page_size: args.page_size,
        filters: args.filters.iter().cloned().collect::<BTreeMap<_, _>>(),
        sorting,
    }
}

/// Content type for a file name, by extension.
pub fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "json" => "application/json",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Read `path` into an upload payload.
pub async fn read_upload_file(
    path: &Path,
    content_type: Option<&str>,
) -> Result<UploadFile, CliError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::Validation {
            field: "file".into(),
            reason: format!("'{}' is not a file", path.display()),
        })?;
    let bytes = tokio::fs::read(path).await?;
    let content_type = content_type
        .map_or_else(|| guess_content_type(&file_name).to_owned(), str::to_owned);
    Ok(UploadFile::new(file_name, content_type, bytes))
}

/// Percentage bar for one upload, hidden when quiet or not a terminal.
pub fn upload_bar(file_name: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("{msg:30!} [{bar:30}] {pos:>3}%") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(file_name.to_owned());
    bar
}

/// Feed transfer progress into `bar`.
pub fn progress_into(bar: &ProgressBar) -> ProgressFn {
    let bar = bar.clone();
    Arc::new(move |progress: TransferProgress| {
        bar.set_position(u64::from(progress.percent()));
    })
}
