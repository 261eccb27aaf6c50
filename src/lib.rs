//! ragdeck - CLI control panel for a RAG document-processing backend
//!
//! The backend owns parsing, text extraction, and embedding generation;
//! ragdeck talks to it over a small set of REST endpoints, watches per-file
//! processing status, and fronts a hosted completion API for chat.

pub mod api;
pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod panel;
pub mod poller;
pub mod progress;
pub mod proxy;

pub use error::{Error, Result};
