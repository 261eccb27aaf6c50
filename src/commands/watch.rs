//! Watch command: follow processing status until completion
//!
//! Drives the status poller over a set of file identifiers, rendering one
//! progress bar per file. When everything has drained, the file list is
//! re-fetched if any job completed: the registry resynchronizes on the
//! refresh signal, never on optimistic local state.

use crate::api::{BackendClient, FileRecord, ProcessingStatus};
use crate::error::Result;
use crate::panel::PanelState;
use crate::poller::{CompletedJob, StatusPoller};
use crate::progress::{add_status_bar, status_marker};
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Result of a watch run
#[derive(Debug, Serialize)]
pub struct WatchOutcome {
    pub completed: Vec<CompletedJob>,
    /// Refreshed registry, present when at least one job finished
    pub files: Option<Vec<FileRecord>>,
}

/// Poll the given identifiers until every one reaches a terminal state
pub async fn cmd_watch(client: &BackendClient, file_ids: &[String]) -> Result<WatchOutcome> {
    let mut panel = PanelState::new();
    for file_id in file_ids {
        panel.file_uploaded(file_id.clone());
    }

    let mut poller = StatusPoller::new(client);
    let mut bars: HashMap<String, ProgressBar> = HashMap::new();
    for file_id in panel.in_flight() {
        poller.track(file_id.clone());
        bars.insert(file_id.clone(), add_status_bar(file_id));
    }

    info!("Watching {} file(s)", poller.tracked().len());

    let completed = poller
        .run(|poller, finished| {
            for file_id in poller.tracked() {
                // No snapshot yet renders as loading, never as an error
                let Some(record) = poller.snapshot(file_id) else {
                    continue;
                };
                if let Some(bar) = bars.get(file_id) {
                    bar.set_position(record.progress as u64);
                    bar.set_message(format!(
                        "{} {}: {}",
                        status_marker(record.status),
                        record.filename,
                        record.message
                    ));
                }
            }

            for job in finished {
                if let Some(bar) = bars.remove(&job.file_id) {
                    bar.set_position(job.record.progress as u64);
                    bar.finish_with_message(format!(
                        "{} {}: {}",
                        status_marker(job.record.status),
                        job.record.filename,
                        job.record.message
                    ));
                }
                panel.processing_complete(&job.file_id);
            }
        })
        .await;

    // The refresh counter moved, so re-fetch the registry
    let files = if panel.refresh_counter() > 0 {
        Some(client.list_files().await?)
    } else {
        None
    };

    Ok(WatchOutcome { completed, files })
}

/// Print the watch summary
pub fn print_watch_outcome(outcome: &WatchOutcome) {
    if outcome.completed.is_empty() {
        println!("Nothing to watch.");
        return;
    }

    println!("\n⚡ Processing finished\n");
    for job in &outcome.completed {
        match job.record.status {
            ProcessingStatus::Completed => {
                println!("✓ {} ({})", job.record.filename, job.file_id);
                if let Some(text_file) = &job.record.text_file {
                    println!("  Text extracted: {}", basename(text_file));
                }
                if let Some(embeddings_file) = &job.record.embeddings_file {
                    println!("  Embeddings created: {}", basename(embeddings_file));
                }
            }
            _ => {
                println!(
                    "✗ {} ({}): {}",
                    job.record.filename, job.file_id, job.record.message
                );
            }
        }
    }

    if let Some(files) = &outcome.files {
        super::print_files(files);
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_strips_directories() {
        assert_eq!(basename("Text_files/report.txt"), "report.txt");
        assert_eq!(basename("report.txt"), "report.txt");
        assert_eq!(basename("C:\\data\\report.txt"), "report.txt");
    }
}
