//! Fan-out dispatcher: one concurrent attempt per registered directory,
//! first success wins.
//!
//! Each query gets a fresh cancellation token and a single-slot completion
//! channel. Attempts push their [`Outcome`] into the channel; the dispatcher
//! drains it under the deadline and cancels everything still in flight the
//! moment a decision is reached. Failures arriving before a success are
//! absorbed, never surfaced: only a success or deadline expiry ends the race.

use crate::{Directory, brasilapi::BrasilApi, fetch, http_client, viacep::ViaCep};
use consulta_types::{Address, Cep, LookupError, Outcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// The winning attempt of a race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Win {
    pub backend: &'static str,
    pub address: Address,
}

/// The set of directories raced for every query.
///
/// Built once and reused across queries; per-query state (token, channel,
/// attempt tasks) is created fresh inside [`Self::resolve`] and fully torn
/// down before it returns.
pub struct Race {
    directories: Vec<Arc<dyn Directory>>,
}

impl Race {
    #[must_use]
    pub fn new(directories: Vec<Arc<dyn Directory>>) -> Self {
        Self { directories }
    }

    /// The two public Brazilian postal directories.
    #[must_use]
    pub fn with_public_directories() -> Self {
        Self::new(vec![Arc::new(BrasilApi::new()), Arc::new(ViaCep::new())])
    }

    /// Resolve one pre-validated query key within `timeout`.
    ///
    /// Returns the first successful attempt; the only error ever returned is
    /// [`LookupError::Timeout`]. No retries: exactly one attempt per
    /// registered directory.
    pub async fn resolve(&self, cep: &Cep, timeout: Duration) -> Result<Win, LookupError> {
        self.resolve_with_token(cep, timeout, CancellationToken::new())
            .await
    }

    /// Like [`Self::resolve`], with a caller-supplied cancellation token.
    ///
    /// The token is cancelled the moment the race is decided, whether by a
    /// win or by the deadline, so callers can observe (or force) teardown of
    /// the in-flight attempts.
    pub async fn resolve_with_token(
        &self,
        cep: &Cep,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<Win, LookupError> {
        let deadline = Instant::now() + timeout;
        // Single-slot completion channel. The dispatcher drains failures, so
        // an attempt blocks on a full slot at most until the next recv; once
        // the race returns, the dropped receiver unblocks any such sender.
        let (tx, mut rx) = mpsc::channel::<Outcome>(1);

        for directory in &self.directories {
            let directory = Arc::clone(directory);
            let client = http_client();
            let cep = cep.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = fetch(directory.as_ref(), client, &cep, &cancel).await;
                // A closed channel means the race has already been decided.
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        loop {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(Outcome {
                    backend,
                    result: Ok(address),
                })) => {
                    cancel.cancel();
                    return Ok(Win { backend, address });
                }
                Ok(Some(Outcome {
                    backend,
                    result: Err(error),
                })) => {
                    // Early failures never short-circuit the race; keep
                    // waiting for a later success or the deadline.
                    tracing::debug!(backend, %error, "attempt failed before the deadline");
                }
                Ok(None) => {
                    // Every attempt has failed and the channel is closed.
                    // Policy: still wait out the deadline rather than fail
                    // fast; callers wanting quick all-failed detection must
                    // track completion counts themselves.
                    tokio::time::sleep_until(deadline).await;
                    cancel.cancel();
                    return Err(LookupError::Timeout);
                }
                Err(_elapsed) => {
                    cancel.cancel();
                    return Err(LookupError::Timeout);
                }
            }
        }
    }
}
