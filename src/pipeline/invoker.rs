//! The alignment call.

use crate::engine::{ResultCode, SyncEngine, SyncRequest};
use crate::error::{Result, SubsyncError};
use crate::options::SyncOptions;
use log::{debug, info};

/// Runs exactly one alignment per call and reports the engine's code as is.
pub struct SyncInvoker<'e, E: SyncEngine> {
    engine: &'e E,
}

impl<'e, E: SyncEngine> SyncInvoker<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Aligns `request.sub_in` against borrowed reference spans.
    ///
    /// The spans stay owned by the caller. On failure the state of
    /// `request.sub_out` is whatever the engine left behind.
    pub fn invoke(
        &self,
        request: &SyncRequest<'_>,
        spans: &E::Spans,
        options: &SyncOptions,
    ) -> ResultCode {
        debug!(
            "Synchronizing {} -> {} ({})",
            request.sub_in.display(),
            request.sub_out.display(),
            options
        );
        let code = self.engine.synchronize(request, spans, options);
        if code.is_success() {
            info!("Wrote {}", request.sub_out.display());
        } else {
            debug!("Engine returned {}", code);
        }
        code
    }
}

/// `Ok` for success, otherwise the code wrapped in [`SubsyncError::Sync`].
pub fn check(code: ResultCode) -> Result<()> {
    if code.is_success() {
        Ok(())
    } else {
        Err(SubsyncError::Sync(code))
    }
}
