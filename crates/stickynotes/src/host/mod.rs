//! Platform-agnostic window host abstraction.
//!
//! This module defines the trait the orchestrator drives windows through and
//! the value types shared with every host implementation. Nothing here knows
//! how windows are actually drawn.

mod remote;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::Event;

pub use remote::RemoteHost;

/// Handle of a window created by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    /// Wrap a raw host handle.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw host handle.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position and size of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// What a window displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// The singleton note list.
    Manager,
    /// A single note.
    Note,
}

impl SurfaceKind {
    /// Name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stacking level used together with the always-on-top flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackingLevel {
    /// Ordinary always-on-top.
    #[default]
    Floating,
    /// Above full-screen windows and other always-on-top surfaces.
    ScreenSaver,
}

/// Everything a host needs to construct a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSpec {
    /// Which view the window loads.
    pub kind: SurfaceKind,
    /// Title shown by hosts that draw one.
    pub title: String,
    /// Initial width.
    pub width: u32,
    /// Initial height.
    pub height: u32,
    /// Minimum width.
    pub min_width: u32,
    /// Minimum height.
    pub min_height: u32,
    /// Initial left edge; host decides when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    /// Initial top edge; host decides when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    /// Draw without OS chrome.
    pub frameless: bool,
    /// Transparent background.
    pub transparent: bool,
    /// Show in taskbar / dock.
    pub show_in_taskbar: bool,
    /// Window icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<PathBuf>,
    /// Start above other windows.
    pub always_on_top: bool,
    /// Stacking level applied when `always_on_top` is set.
    pub level: StackingLevel,
}

/// Window lifecycle events reported by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WindowEvent {
    /// The window's view finished loading and can receive events.
    Ready,
    /// The window was moved or resized.
    BoundsChanged {
        /// The new bounds.
        bounds: Bounds,
    },
    /// The window is gone.
    Closed,
}

/// A host that can create and manipulate windows.
///
/// Hosts report [`WindowEvent`]s asynchronously on the orchestrator's inbound
/// queue rather than returning them from these calls.
pub trait WindowHost: Send {
    /// Construct a window and start loading its view.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot create the window.
    fn create_window(&mut self, spec: &WindowSpec) -> Result<WindowId>;

    /// Bring a window to the front and give it focus.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is not open.
    fn focus(&mut self, window: WindowId) -> Result<()>;

    /// Close a window. The host reports [`WindowEvent::Closed`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the host fails to close the window.
    fn close(&mut self, window: WindowId) -> Result<()>;

    /// Minimize a window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is not open.
    fn minimize(&mut self, window: WindowId) -> Result<()>;

    /// Whether the window currently stays above others.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is not open.
    fn is_always_on_top(&self, window: WindowId) -> Result<bool>;

    /// Set or clear the always-on-top flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is not open.
    fn set_always_on_top(
        &mut self,
        window: WindowId,
        flag: bool,
        level: StackingLevel,
    ) -> Result<()>;

    /// Resize a window, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is not open.
    fn set_size(&mut self, window: WindowId, width: u32, height: u32) -> Result<()>;

    /// Deliver an event to a window's view.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is not open or the view is unreachable.
    fn send(&mut self, window: WindowId, event: Event) -> Result<()>;

    /// Drop bookkeeping for a window the host reported closed.
    fn release(&mut self, window: WindowId);
}
