//! Window host backed by an out-of-process renderer.
//!
//! Every window operation becomes an [`Outbound`] frame. The host mirrors the
//! little state the orchestrator needs to query back (liveness and the
//! always-on-top flag) so that queries never wait on the renderer.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::{StackingLevel, SurfaceKind, WindowEvent, WindowHost, WindowId, WindowSpec};
use crate::error::{Error, Result};
use crate::protocol::{Event, FrameSender, Inbound, InboundSender, Outbound, WindowOp};

#[derive(Debug)]
struct MirroredWindow {
    kind: SurfaceKind,
    always_on_top: bool,
    closing: bool,
}

/// A [`WindowHost`] that forwards operations as frames.
#[derive(Debug)]
pub struct RemoteHost {
    next_id: u64,
    windows: HashMap<WindowId, MirroredWindow>,
    frames: FrameSender,
    inbound: InboundSender,
}

impl RemoteHost {
    /// Create a host writing frames to `frames` and reporting its own
    /// lifecycle events (closes it initiated) to `inbound`.
    #[must_use]
    pub fn new(frames: FrameSender, inbound: InboundSender) -> Self {
        Self {
            next_id: 1,
            windows: HashMap::new(),
            frames,
            inbound,
        }
    }

    /// Number of windows the host believes are open.
    #[must_use]
    pub fn open_windows(&self) -> usize {
        self.windows.values().filter(|w| !w.closing).count()
    }

    /// Kind of surface shown in `window`, if it is open.
    #[must_use]
    pub fn kind_of(&self, window: WindowId) -> Option<SurfaceKind> {
        self.windows
            .get(&window)
            .filter(|w| !w.closing)
            .map(|w| w.kind)
    }

    fn emit(&self, frame: Outbound) -> Result<()> {
        trace!(?frame, "emitting frame");
        self.frames
            .send(frame)
            .map_err(|_| Error::host("renderer frame channel closed"))
    }

    fn op(&self, window: WindowId, op: WindowOp) -> Result<()> {
        self.emit(Outbound::WindowOp { window, op })
    }

    fn open_window(&self, window: WindowId) -> Result<&MirroredWindow> {
        self.windows
            .get(&window)
            .filter(|w| !w.closing)
            .ok_or_else(|| Error::host(format!("window {window} is not open")))
    }

    fn open_window_mut(&mut self, window: WindowId) -> Result<&mut MirroredWindow> {
        self.windows
            .get_mut(&window)
            .filter(|w| !w.closing)
            .ok_or_else(|| Error::host(format!("window {window} is not open")))
    }
}

impl WindowHost for RemoteHost {
    fn create_window(&mut self, spec: &WindowSpec) -> Result<WindowId> {
        let window = WindowId::new(self.next_id);
        self.next_id += 1;

        self.op(window, WindowOp::Create { spec: spec.clone() })?;
        self.windows.insert(
            window,
            MirroredWindow {
                kind: spec.kind,
                always_on_top: spec.always_on_top,
                closing: false,
            },
        );
        debug!(%window, kind = %spec.kind, "window created");
        Ok(window)
    }

    fn focus(&mut self, window: WindowId) -> Result<()> {
        self.open_window(window)?;
        self.op(window, WindowOp::Focus)
    }

    fn close(&mut self, window: WindowId) -> Result<()> {
        let Some(mirrored) = self.windows.get_mut(&window) else {
            debug!(%window, "close requested for unknown window");
            return Ok(());
        };
        if mirrored.closing {
            return Ok(());
        }
        mirrored.closing = true;

        self.op(window, WindowOp::Close)?;
        self.inbound
            .send(Inbound::Window {
                window,
                event: WindowEvent::Closed,
            })
            .map_err(|_| Error::host("orchestrator queue closed"))
    }

    fn minimize(&mut self, window: WindowId) -> Result<()> {
        self.open_window(window)?;
        self.op(window, WindowOp::Minimize)
    }

    fn is_always_on_top(&self, window: WindowId) -> Result<bool> {
        Ok(self.open_window(window)?.always_on_top)
    }

    fn set_always_on_top(
        &mut self,
        window: WindowId,
        flag: bool,
        level: StackingLevel,
    ) -> Result<()> {
        self.open_window_mut(window)?.always_on_top = flag;
        self.op(window, WindowOp::SetAlwaysOnTop { flag, level })
    }

    fn set_size(&mut self, window: WindowId, width: u32, height: u32) -> Result<()> {
        self.open_window(window)?;
        self.op(window, WindowOp::SetSize { width, height })
    }

    fn send(&mut self, window: WindowId, event: Event) -> Result<()> {
        self.open_window(window)?;
        self.emit(Outbound::Event { window, event })
    }

    fn release(&mut self, window: WindowId) {
        if self.windows.remove(&window).is_some() {
            debug!(%window, "window released");
        }
    }
}
