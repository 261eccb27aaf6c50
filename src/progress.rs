//! Progress display helpers for the watch command
//!
//! Keeps the per-file status bars pinned while tracing output scrolls
//! above them.

use crate::api::ProcessingStatus;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

pub fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(|| {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        mp
    })
}

/// One bar per tracked file identifier, 0-100
pub fn add_status_bar(file_id: &str) -> ProgressBar {
    let bar = multi_progress().add(ProgressBar::new(100));
    bar.set_style(
        ProgressStyle::with_template("{prefix:>10} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
            .expect("valid template")
            .progress_chars("=> "),
    );
    bar.set_prefix(file_id.to_string());
    bar.set_message("Loading status...");
    bar
}

/// Marker shown next to a status message
pub fn status_marker(status: ProcessingStatus) -> &'static str {
    match status {
        ProcessingStatus::Completed => "✓",
        ProcessingStatus::Error => "✗",
        ProcessingStatus::Processing => "⟳",
        ProcessingStatus::Queued | ProcessingStatus::Uploaded => "…",
    }
}

/// Routes tracing output through the MultiProgress so log lines don't
/// clobber the pinned bars.
#[derive(Default, Clone)]
pub struct LogWriterFactory;

pub struct LogWriter {
    buffer: String,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.push_str(&String::from_utf8_lossy(buf));

        while let Some(idx) = self.buffer.find('\n') {
            let line = self.buffer[..idx].trim_end_matches('\r').to_string();
            let _ = multi_progress().println(line);
            self.buffer.drain(..idx + 1);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            let _ = multi_progress().println(line);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: String::new(),
        }
    }
}
