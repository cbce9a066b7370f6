//! Message contract between the orchestrator and its surfaces.
//!
//! Surfaces send [`Command`]s and receive [`Event`]s. Both serialize as
//! `{"channel": "<name>", "payload": ...}` so a renderer can map channel names
//! straight onto its own IPC. [`Inbound`] and [`Outbound`] are the frames the
//! orchestrator exchanges with an out-of-process renderer.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::host::{StackingLevel, SurfaceKind, WindowEvent, WindowId, WindowSpec};
use crate::note::{NoteId, NotePatch, NoteRecord, ResizePreset};

/// A request from a surface. The sender is carried alongside, never inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum Command {
    /// Create a record and open a window for it.
    CreateNewNote,
    /// Focus the note's window, opening it if needed.
    OpenNote(NoteId),
    /// Ask for a `refresh-manager-list` push.
    RequestNotesList,
    /// Merge a partial record into the stored one.
    UpdateNoteContent(NotePatch),
    /// Delete a note and close its window.
    DeleteNote(NoteId),
    /// Flip the sender's always-on-top flag.
    TogglePin,
    /// Minimize the sender's window.
    MinimizeNote,
    /// Close the sender's window.
    CloseWindow,
    /// Resize the sender's window to a preset height.
    ResizeMe(ResizePreset),
}

impl Command {
    /// The channel name this command travels on.
    #[must_use]
    pub const fn channel(&self) -> &'static str {
        match self {
            Self::CreateNewNote => "create-new-note",
            Self::OpenNote(_) => "open-note",
            Self::RequestNotesList => "request-notes-list",
            Self::UpdateNoteContent(_) => "update-note-content",
            Self::DeleteNote(_) => "delete-note",
            Self::TogglePin => "toggle-pin",
            Self::MinimizeNote => "minimize-note",
            Self::CloseWindow => "close-window",
            Self::ResizeMe(_) => "resize-me",
        }
    }

    /// Whether a surface of `kind` may send this command at all.
    ///
    /// Per-note ownership checks happen later, in the orchestrator.
    #[must_use]
    pub const fn permitted_for(&self, kind: SurfaceKind) -> bool {
        match kind {
            SurfaceKind::Manager => matches!(
                self,
                Self::CreateNewNote | Self::OpenNote(_) | Self::RequestNotesList | Self::DeleteNote(_)
            ),
            SurfaceKind::Note => matches!(
                self,
                Self::UpdateNoteContent(_)
                    | Self::DeleteNote(_)
                    | Self::TogglePin
                    | Self::MinimizeNote
                    | Self::CloseWindow
                    | Self::ResizeMe(_)
            ),
        }
    }
}

/// A push from the orchestrator to a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum Event {
    /// Initial hydration of a note view, sent once after it is ready.
    LoadNoteData(NoteRecord),
    /// New always-on-top state of the receiving note.
    PinUpdated(bool),
    /// Full replacement of the manager's list.
    RefreshManagerList(Vec<NoteRecord>),
}

/// A window operation requested from an out-of-process renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum WindowOp {
    /// Construct a window.
    Create {
        /// Construction parameters.
        spec: WindowSpec,
    },
    /// Focus the window.
    Focus,
    /// Close the window.
    Close,
    /// Minimize the window.
    Minimize,
    /// Change the always-on-top state.
    SetAlwaysOnTop {
        /// New flag.
        flag: bool,
        /// Stacking level to apply.
        level: StackingLevel,
    },
    /// Resize in place.
    SetSize {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
}

/// Everything the orchestrator consumes, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Inbound {
    /// A surface command.
    Command {
        /// The window that sent it.
        sender: WindowId,
        /// The command itself.
        command: Command,
    },
    /// A host lifecycle event.
    Window {
        /// The window it concerns.
        window: WindowId,
        /// What happened.
        event: WindowEvent,
    },
}

/// Everything the orchestrator emits towards a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Outbound {
    /// Manipulate a window.
    WindowOp {
        /// Target window.
        window: WindowId,
        /// Operation to perform.
        op: WindowOp,
    },
    /// Deliver an event to a window's view.
    Event {
        /// Target window.
        window: WindowId,
        /// The event.
        event: Event,
    },
}

/// Sending half of the orchestrator's inbound queue.
pub type InboundSender = mpsc::UnboundedSender<Inbound>;

/// Receiving half of the orchestrator's inbound queue.
pub type InboundReceiver = mpsc::UnboundedReceiver<Inbound>;

/// Sending half of the renderer frame queue.
pub type FrameSender = mpsc::UnboundedSender<Outbound>;

/// Receiving half of the renderer frame queue.
pub type FrameReceiver = mpsc::UnboundedReceiver<Outbound>;

/// Create the orchestrator's inbound queue.
#[must_use]
pub fn inbound_channel() -> (InboundSender, InboundReceiver) {
    mpsc::unbounded_channel()
}

/// Create the renderer frame queue.
#[must_use]
pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    mpsc::unbounded_channel()
}
