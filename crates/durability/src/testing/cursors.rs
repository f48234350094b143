//! Test cursors

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use snapstream_core::{CursorError, Element, ElementCursor};

/// Cursor over an in-memory list of elements.
///
/// Pulling again after end of sequence is an error, which catches writers
/// that keep reading a finished cursor.
pub struct VecCursor {
    elements: VecDeque<Element>,
    ended: bool,
    pulls: usize,
}

impl VecCursor {
    /// Cursor yielding `elements` in order
    pub fn new(elements: Vec<Element>) -> Self {
        VecCursor {
            elements: elements.into(),
            ended: false,
            pulls: 0,
        }
    }

    /// One single-component element per size, estimated size exactly `size`.
    ///
    /// Element `i` is filled with the byte `i as u8` so order can be checked
    /// after reading chunks back.
    pub fn with_sizes(sizes: &[usize]) -> Self {
        let elements = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| Element::from_bytes(vec![i as u8; size]))
            .collect();
        Self::new(elements)
    }

    /// Number of `next_element` calls so far
    pub fn pulls(&self) -> usize {
        self.pulls
    }
}

impl ElementCursor for VecCursor {
    fn next_element(&mut self) -> Result<Option<Element>, CursorError> {
        self.pulls += 1;
        if self.ended {
            return Err(CursorError::Exhausted);
        }
        let next = self.elements.pop_front();
        self.ended = next.is_none();
        Ok(next)
    }
}

/// Wraps a cursor and fails on a chosen pull.
pub struct FailingCursor<C> {
    inner: C,
    fail_at: usize,
    pulls: usize,
}

impl<C> FailingCursor<C> {
    /// Fail on the pull with zero-based number `fail_at`; earlier pulls are
    /// passed through to `inner`
    pub fn new(inner: C, fail_at: usize) -> Self {
        FailingCursor {
            inner,
            fail_at,
            pulls: 0,
        }
    }
}

impl<C: ElementCursor> ElementCursor for FailingCursor<C> {
    fn next_element(&mut self) -> Result<Option<Element>, CursorError> {
        let pull = self.pulls;
        self.pulls += 1;
        if pull == self.fail_at {
            return Err(CursorError::Source(format!("injected failure at pull {}", pull)));
        }
        self.inner.next_element()
    }
}

#[derive(Debug, Default)]
struct GateState {
    open: bool,
    blocked: bool,
}

#[derive(Debug, Default)]
struct GateInner {
    state: Mutex<GateState>,
    changed: Condvar,
}

/// Control side of a [`GatedCursor`].
#[derive(Debug, Clone)]
pub struct CursorGate {
    inner: Arc<GateInner>,
}

impl CursorGate {
    /// Let the cursor continue, now and for every later pull
    pub fn open(&self) {
        let mut state = self.inner.state.lock();
        state.open = true;
        self.inner.changed.notify_all();
    }

    /// Block until the cursor is parked at the gate.
    ///
    /// Returns immediately if the gate is already open.
    pub fn wait_until_blocked(&self) {
        let mut state = self.inner.state.lock();
        while !state.blocked && !state.open {
            self.inner.changed.wait(&mut state);
        }
    }
}

/// Cursor that passes `free_pulls` pulls straight through, then parks on the
/// next pull until its [`CursorGate`] is opened.
pub struct GatedCursor<C> {
    inner: C,
    free_pulls: usize,
    pulls: usize,
    gate: Arc<GateInner>,
}

impl<C> GatedCursor<C> {
    /// Wrap `inner`; returns the cursor and the gate controlling it
    pub fn new(inner: C, free_pulls: usize) -> (Self, CursorGate) {
        let gate = Arc::new(GateInner::default());
        let cursor = GatedCursor {
            inner,
            free_pulls,
            pulls: 0,
            gate: Arc::clone(&gate),
        };
        (cursor, CursorGate { inner: gate })
    }
}

impl<C: ElementCursor> ElementCursor for GatedCursor<C> {
    fn next_element(&mut self) -> Result<Option<Element>, CursorError> {
        if self.pulls >= self.free_pulls {
            let mut state = self.gate.state.lock();
            if !state.open {
                state.blocked = true;
                self.gate.changed.notify_all();
                while !state.open {
                    self.gate.changed.wait(&mut state);
                }
                state.blocked = false;
            }
        }
        self.pulls += 1;
        self.inner.next_element()
    }
}
