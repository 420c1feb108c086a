//! One-time readiness precondition
//!
//! The adapter cannot do anything useful until its root directory exists and
//! is readable. [`ReadyGate`] runs that check once, shares the outcome with
//! every caller, and never re-runs it: a failure is terminal.

use crate::error::{AdapterError, Result};
use crate::traits::FsDriver;
use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Observable state of the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyState {
    /// The check has not settled yet
    Pending,
    /// The root is usable
    Ready,
    /// The check failed; the reason is reported to every caller
    Failed(String),
}

type Check = Shared<LocalBoxFuture<'static, std::result::Result<(), String>>>;

/// Shared, poll-once readiness check
#[derive(Clone)]
pub struct ReadyGate {
    check: Check,
}

impl ReadyGate {
    /// Wrap an arbitrary readiness check
    ///
    /// The check is started by the first [`wait`](Self::wait) and polled to
    /// completion exactly once, however many callers wait on it.
    pub fn new<F>(check: F) -> Self
    where
        F: Future<Output = std::result::Result<(), String>> + 'static,
    {
        Self {
            check: check.boxed_local().shared(),
        }
    }

    /// Gate on `root`: create it if missing, then require it to be readable
    ///
    /// Missing directories are created with `dir_bits`.
    pub fn initialize<D: FsDriver>(driver: D, root: PathBuf, dir_bits: u32) -> Self {
        Self::new(async move {
            debug!("Ensuring root directory {} exists", root.display());
            driver
                .ensure_directory(&root, dir_bits)
                .await
                .map_err(|e| format!("Impossible to create the root directory {}: {e}", root.display()))?;

            if !driver.is_readable(&root).await {
                return Err(format!("The root path {} is not readable.", root.display()));
            }

            info!("Adapter root {} is ready", root.display());
            Ok(())
        })
    }

    /// Wait for the check to settle
    ///
    /// # Errors
    ///
    /// Returns `Err(AdapterError::Initialization)` with the same reason on
    /// every call once the check has failed.
    pub async fn wait(&self) -> Result<()> {
        self.check.clone().await.map_err(|reason| {
            warn!("Rejecting operation: {}", reason);
            AdapterError::Initialization(reason)
        })
    }

    /// Get the current state without driving the check
    #[must_use]
    pub fn state(&self) -> ReadyState {
        match self.check.peek() {
            None => ReadyState::Pending,
            Some(Ok(())) => ReadyState::Ready,
            Some(Err(reason)) => ReadyState::Failed(reason.clone()),
        }
    }
}
