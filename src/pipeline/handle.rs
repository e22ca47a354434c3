//! Scoped ownership of engine handles.

use crate::engine::SyncEngine;
use log::trace;
use std::fmt;

/// Which kind of engine handle a guard holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Sink,
    Voice,
    Spans,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Sink => f.write_str("sink"),
            HandleKind::Voice => f.write_str("voice activity"),
            HandleKind::Spans => f.write_str("time spans"),
        }
    }
}

/// An engine handle that is released when the guard goes out of scope.
///
/// The handle leaves the guard in one of three ways: [`into_inner`] hands it
/// to a consuming engine call, [`release`] gives it back explicitly, and
/// dropping the guard releases it on any other path, including early
/// returns through `?`.
///
/// [`into_inner`]: Owned::into_inner
/// [`release`]: Owned::release
pub struct Owned<'e, E: SyncEngine + ?Sized, H> {
    engine: &'e E,
    handle: Option<H>,
    release: fn(&E, H),
    kind: HandleKind,
}

impl<'e, E: SyncEngine + ?Sized> Owned<'e, E, E::Sink> {
    pub fn sink(engine: &'e E, sink: E::Sink) -> Self {
        Self::new(engine, sink, E::release_sink, HandleKind::Sink)
    }
}

impl<'e, E: SyncEngine + ?Sized> Owned<'e, E, E::Voice> {
    pub fn voice(engine: &'e E, voice: E::Voice) -> Self {
        Self::new(engine, voice, E::release_voice, HandleKind::Voice)
    }
}

impl<'e, E: SyncEngine + ?Sized> Owned<'e, E, E::Spans> {
    pub fn spans(engine: &'e E, spans: E::Spans) -> Self {
        Self::new(engine, spans, E::release_spans, HandleKind::Spans)
    }
}

impl<'e, E: SyncEngine + ?Sized, H> Owned<'e, E, H> {
    fn new(engine: &'e E, handle: H, release: fn(&E, H), kind: HandleKind) -> Self {
        Self {
            engine,
            handle: Some(handle),
            release,
            kind,
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn get(&self) -> &H {
        match &self.handle {
            Some(handle) => handle,
            None => unreachable!("{} handle accessed after it left its guard", self.kind),
        }
    }

    pub fn get_mut(&mut self) -> &mut H {
        match &mut self.handle {
            Some(handle) => handle,
            None => unreachable!("{} handle accessed after it left its guard", self.kind),
        }
    }

    /// Takes the handle out without releasing it. The caller now owns it.
    pub fn into_inner(mut self) -> H {
        match self.handle.take() {
            Some(handle) => handle,
            None => unreachable!("{} handle taken twice", self.kind),
        }
    }

    /// Releases the handle now.
    pub fn release(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!("Releasing {} handle", self.kind);
            (self.release)(self.engine, handle);
        }
    }
}

impl<E: SyncEngine + ?Sized, H> Drop for Owned<'_, E, H> {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl<E: SyncEngine + ?Sized, H: fmt::Debug> fmt::Debug for Owned<'_, E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owned")
            .field("kind", &self.kind)
            .field("handle", &self.handle)
            .finish()
    }
}
