use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::foundation::error::{PlotError, PlotResult};

/// Cooperative cancellation flag shared between the driver and whoever wants it to stop.
///
/// The driver polls it between runs and between generations; nothing is interrupted
/// mid-frame or mid-encode.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return `Err(PlotError::Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> PlotResult<()> {
        if self.is_cancelled() {
            Err(PlotError::Cancelled)
        } else {
            Ok(())
        }
    }
}
