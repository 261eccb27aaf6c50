//! File registry commands: list, delete, process
//!
//! Delete is the one destructive operation and requires confirmation
//! before any request leaves the process. Neither delete nor process
//! mutates local state; the file list is resynchronized by re-fetching.

use crate::api::{BackendClient, FileRecord, UploadReceipt};
use crate::error::Result;
use chrono::{Local, TimeZone};
use tracing::info;

/// Fetch the file registry
pub async fn cmd_list_files(client: &BackendClient) -> Result<Vec<FileRecord>> {
    info!("Listing files");
    client.list_files().await
}

/// Delete a file and its derivatives after interactive confirmation.
///
/// Returns `Ok(false)` when the user declines; no DELETE request is
/// issued in that case.
pub async fn cmd_delete_file<F>(
    client: &BackendClient,
    filename: &str,
    confirm: F,
) -> Result<bool>
where
    F: FnOnce(&str) -> bool,
{
    let prompt = format!(
        "Are you sure you want to delete \"{}\" and all associated files?",
        filename
    );
    if !confirm(&prompt) {
        info!("Delete of {} aborted", filename);
        return Ok(false);
    }

    client.delete_file(filename).await?;
    info!("Deleted {}", filename);
    Ok(true)
}

/// Trigger processing of a file already on the backend
pub async fn cmd_process_file(client: &BackendClient, filename: &str) -> Result<UploadReceipt> {
    info!("Requesting processing of {}", filename);
    client.process_local(filename).await
}

/// Format a byte count the way the panel displays it: powers of 1024,
/// up to two decimals with trailing zeros trimmed
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exponent = (((bytes as f64).ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);

    let mut formatted = format!("{:.2}", value);
    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }
    format!("{} {}", formatted, UNITS[exponent])
}

/// Render a modification time (seconds since the epoch) in local time
pub fn format_modified(secs: f64) -> String {
    match Local.timestamp_opt(secs as i64, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}

/// Print the file registry to console
pub fn print_files(files: &[FileRecord]) {
    println!("\n📁 Document Files ({})\n", files.len());

    if files.is_empty() {
        println!("No files found.");
        println!("Upload files or place them in the backend's Documents folder.");
        return;
    }

    for file in files {
        let text = if file.text_exists { "✓" } else { "✗" };
        let embeddings = if file.embeddings_exist { "✓" } else { "✗" };
        println!("• {}", file.filename);
        println!(
            "  {}  {}  Text {}  Embeddings {}",
            format_file_size(file.size),
            format_modified(file.modified),
            text,
            embeddings
        );
    }
}
