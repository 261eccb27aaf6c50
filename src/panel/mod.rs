//! Shared shell state for the control panel
//!
//! Three pieces of state are threaded between the panel's views: the
//! active tab, the set of in-flight file identifiers, and a refresh
//! counter the file list re-reads on. Nothing here is persisted or global;
//! the struct lives inside whichever command owns the interaction.

use std::fmt;

/// The control panel's views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Upload,
    Files,
    Status,
    Config,
    Chat,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tab::Upload => "upload",
            Tab::Files => "files",
            Tab::Status => "status",
            Tab::Config => "config",
            Tab::Chat => "chat",
        };
        write!(f, "{}", name)
    }
}

/// Minimal shared state threaded between the views
#[derive(Debug)]
pub struct PanelState {
    active_tab: Tab,
    in_flight: Vec<String>,
    refresh_counter: u64,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Upload,
            in_flight: Vec::new(),
            refresh_counter: 0,
        }
    }
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    /// Identifiers currently being processed
    pub fn in_flight(&self) -> &[String] {
        &self.in_flight
    }

    /// Counter the file list resynchronizes on; bumped, never reset
    pub fn refresh_counter(&self) -> u64 {
        self.refresh_counter
    }

    /// A file was uploaded (or processing was triggered): register the
    /// identifier and switch to the status view
    pub fn file_uploaded(&mut self, file_id: impl Into<String>) {
        let file_id = file_id.into();
        if !self.in_flight.contains(&file_id) {
            self.in_flight.push(file_id);
        }
        self.active_tab = Tab::Status;
    }

    /// Processing finished for an identifier: drop it and signal the file
    /// list to re-fetch. No optimistic mutation happens anywhere else.
    pub fn processing_complete(&mut self, file_id: &str) {
        self.in_flight.retain(|id| id != file_id);
        self.refresh_counter += 1;
    }

    /// Explicit refresh request from the user
    pub fn request_refresh(&mut self) {
        self.refresh_counter += 1;
    }
}
