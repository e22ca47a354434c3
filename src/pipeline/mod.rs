//! Reference pipeline and alignment invocation.
//!
//! Builds the reference time spans from a subtitle file or raw audio, hands
//! them to the engine for one alignment call, and keeps every engine handle
//! under a release guard along the way.

pub mod error;
pub mod handle;
pub mod invoker;
pub mod reference;
pub mod types;

pub use handle::{HandleKind, Owned};
pub use invoker::{SyncInvoker, check};
pub use reference::{ReferencePipeline, SpansGuard};
pub use types::{IngestStats, PipelineState, Stage};
