//! `stickynotes` - Desktop sticky notes with file-backed persistence
//!
//! This library provides the orchestrator that owns note windows and the
//! on-disk note store, the message contract its surfaces speak, and a
//! renderer bridge that lets any out-of-process UI draw the windows.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod note;
pub mod orchestrator;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use host::{RemoteHost, WindowHost, WindowId};
pub use logging::init_logging;
pub use note::{NoteId, NotePatch, NoteRecord, ResizePreset};
pub use orchestrator::Orchestrator;
pub use protocol::{Command, Event, Inbound, Outbound};
pub use store::NoteStore;
