//! Live update sink.
//!
//! Writers (input listeners, telemetry feeds, the host page) hold clones of a
//! [`ParamSink`]. Writes are queued and applied at the start of the next
//! tick, so a value written mid-frame is never seen half-applied.

use crate::intent::InputEvent;
use crate::params::ParamId;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    SetTarget(ParamId, f32),
    Input(InputEvent),
}

#[derive(Debug, Default)]
pub(crate) struct Inbox {
    commands: Vec<Command>,
    closed: bool,
}

/// Cloneable single-threaded handle onto the engine's inbox.
#[derive(Clone, Debug, Default)]
pub struct ParamSink {
    inbox: Rc<RefCell<Inbox>>,
}

impl ParamSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a target write by external name; unknown names are logged and dropped.
    pub fn set(&self, name: &str, value: f32) -> bool {
        match ParamId::from_name(name) {
            Some(id) => self.set_id(id, value),
            None => {
                log::debug!("[params] ignoring update for unknown parameter '{}'", name);
                false
            }
        }
    }

    pub fn set_id(&self, id: ParamId, value: f32) -> bool {
        self.push(Command::SetTarget(id, value))
    }

    pub fn input(&self, ev: InputEvent) -> bool {
        self.push(Command::Input(ev))
    }

    fn push(&self, cmd: Command) -> bool {
        let mut inbox = self.inbox.borrow_mut();
        if inbox.closed {
            return false;
        }
        inbox.commands.push(cmd);
        true
    }

    pub fn pending(&self) -> usize {
        self.inbox.borrow().commands.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inbox.borrow().closed
    }

    pub(crate) fn drain(&self) -> SmallVec<[Command; 8]> {
        self.inbox.borrow_mut().commands.drain(..).collect()
    }

    /// Drop queued writes and refuse new ones.
    pub(crate) fn close(&self) {
        let mut inbox = self.inbox.borrow_mut();
        inbox.closed = true;
        inbox.commands.clear();
    }
}
