//! The privileged coordinator of windows and storage.
//!
//! Every inbound command and window event passes through
//! [`Orchestrator::dispatch`], one at a time. Handlers run to completion and
//! never await, so the store sees strictly serialized reads and writes.

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::host::{StackingLevel, SurfaceKind, WindowEvent, WindowHost, WindowId, WindowSpec};
use crate::note::{NoteId, NotePatch, NoteRecord, ResizePreset};
use crate::protocol::{Command, Event, Inbound};
use crate::registry::{NoteWindow, WindowRegistry};
use crate::store::NoteStore;

/// Stacking level applied to pinned notes.
const PIN_LEVEL: StackingLevel = StackingLevel::ScreenSaver;

/// Who sent a command, resolved from the sender's window.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Sender {
    Manager,
    Note(NoteId),
}

impl Sender {
    fn kind(&self) -> SurfaceKind {
        match self {
            Self::Manager => SurfaceKind::Manager,
            Self::Note(_) => SurfaceKind::Note,
        }
    }
}

/// Owns the store, the window registry and the manager reference.
#[derive(Debug)]
pub struct Orchestrator<H> {
    config: Config,
    store: NoteStore,
    host: H,
    registry: WindowRegistry,
    manager: Option<WindowId>,
}

impl<H: WindowHost> Orchestrator<H> {
    /// Create an orchestrator with no open windows.
    #[must_use]
    pub fn new(config: Config, store: NoteStore, host: H) -> Self {
        Self {
            config,
            store,
            host,
            registry: WindowRegistry::new(),
            manager: None,
        }
    }

    /// The window host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The note store.
    #[must_use]
    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// The open note windows.
    #[must_use]
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// The live manager window, if any.
    #[must_use]
    pub fn manager_window(&self) -> Option<WindowId> {
        self.manager
    }

    /// Handle one inbound message, logging instead of propagating failures so
    /// that one bad request never takes the other windows down.
    pub fn dispatch(&mut self, inbound: Inbound) {
        let result = match inbound {
            Inbound::Command { sender, command } => {
                let channel = command.channel();
                debug!(%sender, channel, "command received");
                self.handle_command(sender, command)
            }
            Inbound::Window { window, event } => {
                debug!(%window, ?event, "window event received");
                self.handle_window_event(window, event)
            }
        };

        if let Err(e) = result {
            if e.is_rejected_command() {
                warn!("Rejected command: {e}");
            } else {
                error!("Handler failed: {e}");
            }
        }
    }

    /// Apply a command from the surface in `sender`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender is unknown, the command is outside its
    /// capability set, or the store or host fails.
    pub fn handle_command(&mut self, sender: WindowId, command: Command) -> Result<()> {
        let from = self.resolve_sender(sender, &command)?;

        match command {
            Command::CreateNewNote => self.open_or_create_note(None).map(drop),
            Command::OpenNote(id) => self.open_or_create_note(Some(&id)).map(drop),
            Command::RequestNotesList => {
                let notes = self.store.load_all()?;
                self.host.send(sender, Event::RefreshManagerList(notes))
            }
            Command::UpdateNoteContent(patch) => {
                let id = own_note(&from, patch.id.as_ref(), "update-note-content")?;
                self.update_note(&id, &patch.without_window_state())
            }
            Command::DeleteNote(id) => {
                if let Sender::Note(own) = &from {
                    if *own != id {
                        return Err(Error::forbidden(
                            "delete-note",
                            "note",
                            format!("a note may only delete itself, not {id}"),
                        ));
                    }
                }
                self.delete_note(&id)
            }
            Command::TogglePin => {
                let id = own_note(&from, None, "toggle-pin")?;
                self.toggle_pin(sender, &id).map(drop)
            }
            Command::MinimizeNote => self.host.minimize(sender),
            Command::CloseWindow => {
                // Untrack now so a queued open-note builds a fresh window
                // instead of focusing one that is already going away.
                if let Sender::Note(id) = &from {
                    self.registry.remove(id);
                }
                self.host.close(sender)
            }
            Command::ResizeMe(preset) => {
                let id = own_note(&from, None, "resize-me")?;
                self.resize_to_preset(sender, &id, preset)
            }
        }
    }

    /// Apply a lifecycle event the host reported for `window`.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting new geometry or delivering hydration
    /// fails.
    pub fn handle_window_event(&mut self, window: WindowId, event: WindowEvent) -> Result<()> {
        if self.manager == Some(window) {
            if event == WindowEvent::Closed {
                info!(%window, "manager window closed");
                self.manager = None;
                self.host.release(window);
            }
            return Ok(());
        }

        let Some(id) = self.registry.note_for_window(window) else {
            if event == WindowEvent::Closed {
                self.host.release(window);
            } else {
                debug!(%window, ?event, "event for untracked window ignored");
            }
            return Ok(());
        };

        match event {
            WindowEvent::Ready => self.hydrate(&id),
            WindowEvent::BoundsChanged { bounds } => {
                let merged = self.store.merge(&id, &NotePatch::geometry(id.clone(), bounds))?;
                self.cache(&id, merged);
                Ok(())
            }
            WindowEvent::Closed => {
                // Content was persisted on its last edit; only the tracking goes.
                self.registry.remove(&id);
                self.host.release(window);
                debug!(%window, note = %id, "note window closed");
                Ok(())
            }
        }
    }

    /// Focus the manager, creating it if it is not open.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot focus or create the window.
    pub fn open_or_create_manager(&mut self) -> Result<WindowId> {
        if let Some(window) = self.manager {
            self.host.focus(window)?;
            return Ok(window);
        }

        let window = self.host.create_window(&self.manager_spec())?;
        self.manager = Some(window);
        info!(%window, "manager window opened");
        Ok(window)
    }

    /// Focus or open the note `id`, or create a new note when `id` is absent
    /// or unknown to the store.
    ///
    /// Returns the note's id and window.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or host fails.
    pub fn open_or_create_note(&mut self, id: Option<&NoteId>) -> Result<(NoteId, WindowId)> {
        let existing = id.filter(|id| self.store.exists(id));

        let (record, created) = if let Some(id) = existing {
            if let Some(entry) = self.registry.get(id) {
                let window = entry.window;
                self.host.focus(window)?;
                debug!(%window, note = %id, "focused existing note window");
                return Ok((id.clone(), window));
            }
            (self.store.load(id)?, false)
        } else {
            if let Some(id) = id {
                debug!(note = %id, "no record on disk; creating a new note instead");
            }
            let record = NoteRecord::new(&self.config.note);
            self.store.save(&record)?;
            (record, true)
        };

        let note_id = record.id.clone();
        let window = self.host.create_window(&self.note_spec(&record))?;
        self.registry.put(note_id.clone(), NoteWindow::new(window, record));
        info!(%window, note = %note_id, created, "note window opened");

        if created {
            self.notify_manager_changed()?;
        }
        Ok((note_id, window))
    }

    /// Push the full note list to the manager, if it is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be built or delivered.
    pub fn notify_manager_changed(&mut self) -> Result<()> {
        let Some(manager) = self.manager else {
            return Ok(());
        };
        let notes = self.store.load_all()?;
        debug!(count = notes.len(), "refreshing manager list");
        self.host.send(manager, Event::RefreshManagerList(notes))
    }

    /// Flip the pin state of the note shown in `window`.
    ///
    /// Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or store fails.
    pub fn toggle_pin(&mut self, window: WindowId, id: &NoteId) -> Result<bool> {
        let pinned = !self.host.is_always_on_top(window)?;

        // Persist first: a record that cannot be written leaves the window alone.
        let merged = self.store.merge(id, &NotePatch::pinned(id.clone(), pinned))?;
        if let Err(e) = self.host.set_always_on_top(window, pinned, PIN_LEVEL) {
            let restored = self.store.merge(id, &NotePatch::pinned(id.clone(), !pinned))?;
            self.cache(id, restored);
            return Err(e);
        }
        self.cache(id, merged);

        self.host.send(window, Event::PinUpdated(pinned))?;
        debug!(%window, note = %id, pinned, "pin toggled");
        Ok(pinned)
    }

    fn update_note(&mut self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        let merged = self.store.merge(id, patch)?;
        self.cache(id, merged);
        self.notify_manager_changed()
    }

    fn delete_note(&mut self, id: &NoteId) -> Result<()> {
        let removed = self.store.delete(id)?;
        if let Some(entry) = self.registry.remove(id) {
            self.host.close(entry.window)?;
        }
        info!(note = %id, removed, "note deleted");
        self.notify_manager_changed()
    }

    fn resize_to_preset(&mut self, window: WindowId, id: &NoteId, preset: ResizePreset) -> Result<()> {
        let width = self
            .registry
            .get(id)
            .map_or(self.config.note.width, |entry| entry.state.width);
        debug!(%window, %preset, width, "resizing to preset");
        self.host.set_size(window, width, preset.height())
    }

    fn hydrate(&mut self, id: &NoteId) -> Result<()> {
        let Some(entry) = self.registry.get_mut(id) else {
            return Ok(());
        };
        if entry.hydrated {
            debug!(note = %id, "note already hydrated");
            return Ok(());
        }
        entry.hydrated = true;
        let (window, state) = (entry.window, entry.state.clone());
        self.host.send(window, Event::LoadNoteData(state))
    }

    fn cache(&mut self, id: &NoteId, record: NoteRecord) {
        if let Some(entry) = self.registry.get_mut(id) {
            entry.state = record;
        }
    }

    fn resolve_sender(&self, window: WindowId, command: &Command) -> Result<Sender> {
        let from = if self.manager == Some(window) {
            Sender::Manager
        } else if let Some(id) = self.registry.note_for_window(window) {
            Sender::Note(id)
        } else {
            return Err(Error::UnknownSender {
                window,
                command: command.channel(),
            });
        };

        let kind = from.kind();
        if !command.permitted_for(kind) {
            return Err(Error::forbidden(
                command.channel(),
                kind.as_str(),
                "outside this surface's capabilities",
            ));
        }
        Ok(from)
    }

    fn manager_spec(&self) -> WindowSpec {
        let manager = &self.config.manager;
        WindowSpec {
            kind: SurfaceKind::Manager,
            title: "Sticky Notes".to_string(),
            width: manager.width,
            height: manager.height,
            min_width: manager.min_width,
            min_height: manager.min_height,
            x: None,
            y: None,
            frameless: false,
            transparent: false,
            show_in_taskbar: true,
            icon: self.config.window.icon.clone(),
            always_on_top: false,
            level: StackingLevel::default(),
        }
    }

    fn note_spec(&self, record: &NoteRecord) -> WindowSpec {
        let (note, chrome) = (&self.config.note, &self.config.window);
        WindowSpec {
            kind: SurfaceKind::Note,
            title: "Note".to_string(),
            width: record.width.max(note.min_width),
            height: record.height.max(note.min_height),
            min_width: note.min_width,
            min_height: note.min_height,
            x: record.x,
            y: record.y,
            frameless: chrome.frameless,
            transparent: chrome.transparent,
            show_in_taskbar: chrome.show_in_taskbar,
            icon: chrome.icon.clone(),
            always_on_top: record.is_pinned,
            level: PIN_LEVEL,
        }
    }
}

/// Resolve the note a note-only command targets, enforcing that a note
/// surface only ever touches its own record.
fn own_note(from: &Sender, claimed: Option<&NoteId>, command: &'static str) -> Result<NoteId> {
    let Sender::Note(own) = from else {
        return Err(Error::forbidden(command, "manager", "note surfaces only"));
    };
    match claimed {
        Some(claimed) if claimed != own => Err(Error::forbidden(
            command,
            "note",
            format!("note {own} may not modify note {claimed}"),
        )),
        _ => Ok(own.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Bounds, RemoteHost};
    use crate::logging::init_test_logging;
    use crate::protocol::{
        frame_channel, inbound_channel, FrameReceiver, InboundReceiver, Outbound, WindowOp,
    };

    struct Harness {
        _dir: tempfile::TempDir,
        orch: Orchestrator<RemoteHost>,
        frames: FrameReceiver,
        inbound: InboundReceiver,
    }

    impl Harness {
        fn new() -> Self {
            init_test_logging();
            let dir = tempfile::tempdir().unwrap();
            let store = NoteStore::open(dir.path()).unwrap();
            let (frame_tx, frames) = frame_channel();
            let (inbound_tx, inbound) = inbound_channel();
            let host = RemoteHost::new(frame_tx, inbound_tx);
            Self {
                _dir: dir,
                orch: Orchestrator::new(Config::default(), store, host),
                frames,
                inbound,
            }
        }

        fn drain(&mut self) -> Vec<Outbound> {
            std::iter::from_fn(|| self.frames.try_recv().ok()).collect()
        }

        fn pump(&mut self) {
            while let Ok(msg) = self.inbound.try_recv() {
                self.orch.dispatch(msg);
            }
        }
    }

    #[test]
    fn test_manager_is_singleton() {
        let mut h = Harness::new();
        let first = h.orch.open_or_create_manager().unwrap();
        let second = h.orch.open_or_create_manager().unwrap();

        assert_eq!(first, second);
        let frames = h.drain();
        assert!(matches!(
            frames.as_slice(),
            [
                Outbound::WindowOp {
                    op: WindowOp::Create { .. },
                    ..
                },
                Outbound::WindowOp {
                    op: WindowOp::Focus,
                    ..
                }
            ]
        ));
    }

    #[test]
    fn test_manager_reference_cleared_on_close() {
        let mut h = Harness::new();
        let first = h.orch.open_or_create_manager().unwrap();
        h.orch
            .handle_window_event(first, WindowEvent::Closed)
            .unwrap();

        assert!(h.orch.manager_window().is_none());
        let second = h.orch.open_or_create_manager().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_hydration_waits_for_ready() {
        let mut h = Harness::new();
        let (id, window) = h.orch.open_or_create_note(None).unwrap();

        assert!(!h
            .drain()
            .iter()
            .any(|f| matches!(f, Outbound::Event { .. })));

        h.orch
            .handle_window_event(window, WindowEvent::Ready)
            .unwrap();
        h.orch
            .handle_window_event(window, WindowEvent::Ready)
            .unwrap();

        let loads: Vec<_> = h
            .drain()
            .into_iter()
            .filter_map(|f| match f {
                Outbound::Event {
                    event: Event::LoadNoteData(record),
                    ..
                } => Some(record),
                _ => None,
            })
            .collect();
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].id, id);
    }

    #[test]
    fn test_bounds_change_is_written_through() {
        let mut h = Harness::new();
        let (id, window) = h.orch.open_or_create_note(None).unwrap();
        let bounds = Bounds {
            x: 40,
            y: 50,
            width: 320,
            height: 280,
        };

        h.orch
            .handle_window_event(window, WindowEvent::BoundsChanged { bounds })
            .unwrap();

        assert_eq!(h.orch.store().load(&id).unwrap().bounds(), Some(bounds));
        assert_eq!(h.orch.registry().get(&id).unwrap().state.width, 320);
    }

    #[test]
    fn test_note_cannot_edit_another_note() {
        let mut h = Harness::new();
        let (a, wa) = h.orch.open_or_create_note(None).unwrap();
        let (b, _) = h.orch.open_or_create_note(None).unwrap();

        let err = h
            .orch
            .handle_command(
                wa,
                Command::UpdateNoteContent(NotePatch::content(b.clone(), "hijack")),
            )
            .unwrap_err();
        assert!(err.is_rejected_command());
        assert_eq!(h.orch.store().load(&b).unwrap().content, "");
        assert_eq!(h.orch.store().load(&a).unwrap().content, "");
    }

    #[test]
    fn test_patch_without_id_targets_sender() {
        let mut h = Harness::new();
        let (id, window) = h.orch.open_or_create_note(None).unwrap();
        let patch = NotePatch {
            content: Some("hello".to_string()),
            ..NotePatch::default()
        };

        h.orch
            .handle_command(window, Command::UpdateNoteContent(patch))
            .unwrap();
        assert_eq!(h.orch.store().load(&id).unwrap().content, "hello");
    }

    #[test]
    fn test_manager_cannot_toggle_pin() {
        let mut h = Harness::new();
        let manager = h.orch.open_or_create_manager().unwrap();
        let err = h
            .orch
            .handle_command(manager, Command::TogglePin)
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));
    }

    #[test]
    fn test_unknown_sender_rejected() {
        let mut h = Harness::new();
        let err = h
            .orch
            .handle_command(WindowId::new(42), Command::RequestNotesList)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownSender { .. }));
    }

    #[test]
    fn test_close_window_untracks_note() {
        let mut h = Harness::new();
        let (id, window) = h.orch.open_or_create_note(None).unwrap();

        h.orch
            .handle_command(window, Command::CloseWindow)
            .unwrap();
        h.pump();

        assert!(h.orch.registry().get(&id).is_none());
        assert!(h.orch.store().exists(&id));
    }

    #[test]
    fn test_dispatch_survives_handler_errors() {
        let mut h = Harness::new();
        h.orch.dispatch(Inbound::Command {
            sender: WindowId::new(7),
            command: Command::TogglePin,
        });
        let (_, window) = h.orch.open_or_create_note(None).unwrap();
        h.orch.dispatch(Inbound::Command {
            sender: window,
            command: Command::MinimizeNote,
        });

        assert!(h.drain().iter().any(|f| matches!(
            f,
            Outbound::WindowOp {
                op: WindowOp::Minimize,
                ..
            }
        )));
    }
}
