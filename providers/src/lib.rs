//! Postal directory clients and the fan-out race that queries them.
//!
//! # Architecture
//!
//! The crate is organized around a per-backend adapter pattern:
//!
//! - [`Directory`] - One implementation per remote directory; owns that
//!   backend's URL template and its exclusive decode/classify path.
//! - [`brasilapi`] - BrasilAPI client (flat JSON schema).
//! - [`viacep`] - ViaCEP client (legacy JSON schema with an in-body `erro`
//!   not-found flag).
//! - [`race`] - Fan-out dispatcher launching one concurrent attempt per
//!   registered directory; first success wins, losers are cancelled.
//!
//! Every attempt funnels its result through one [`Outcome`] value, so the
//! dispatcher never needs to know which backends exist or how they encode
//! failure. Registering a new directory means implementing [`Directory`];
//! the dispatcher is untouched.
//!
//! # Error Handling
//!
//! Adapters classify failures into [`LookupError`] the moment they occur.
//! Failures that land before a success or the deadline are absorbed by the
//! dispatcher (logged at debug level, never surfaced); the single terminal
//! outcome of a race is the first success or `Timeout`.

pub mod brasilapi;
pub mod race;
pub mod viacep;

use consulta_types::{Address, Cep, LookupError, Outcome};
use std::sync::OnceLock;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use consulta_types;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 1_000;

/// Process-wide HTTP client shared by every attempt across queries.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build tuned HTTP client: {e}. Using default client.");
                reqwest::Client::new()
            })
    })
}

/// Wall-clock budget for one query, shared by all attempts.
///
/// Overridable through `CONSULTA_TIMEOUT_MS`; invalid or zero values fall
/// back to the 1 second default.
pub fn lookup_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let ms = std::env::var("CONSULTA_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_LOOKUP_TIMEOUT_MS);
        Duration::from_millis(ms)
    })
}

/// One remote postal directory.
///
/// Implementations are registered with [`race::Race`] and selected there by
/// trait dispatch; no code branches on backend names at decode time. Each
/// implementation recognizes its own not-found marker and maps its native
/// response shape to the canonical [`Address`].
pub trait Directory: Send + Sync {
    /// Stable tag identifying this backend in outcomes and rendering.
    fn name(&self) -> &'static str;

    /// Request URL for one query key.
    fn url(&self, cep: &Cep) -> String;

    /// Parse this backend's native response body into the canonical record,
    /// or classify the failure.
    fn decode(&self, body: &[u8]) -> Result<Address, LookupError>;
}

/// Run one attempt against one directory, bound to the race's shared
/// cancellation token.
///
/// The deadline is enforced solely through the token: when it fires the
/// attempt aborts whatever it is waiting on and reports `Timeout`. No
/// per-adapter timer exists.
pub(crate) async fn fetch(
    directory: &dyn Directory,
    client: &reqwest::Client,
    cep: &Cep,
    cancel: &CancellationToken,
) -> Outcome {
    Outcome {
        backend: directory.name(),
        result: fetch_classified(directory, client, cep, cancel).await,
    }
}

async fn fetch_classified(
    directory: &dyn Directory,
    client: &reqwest::Client,
    cep: &Cep,
    cancel: &CancellationToken,
) -> Result<Address, LookupError> {
    let url = directory.url(cep);

    let response = tokio::select! {
        () = cancel.cancelled() => return Err(LookupError::Timeout),
        response = client.get(&url).send() => {
            response.map_err(|e| LookupError::Transport(e.to_string()))?
        }
    };

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(LookupError::HttpStatus(status.as_u16()));
    }

    let body = tokio::select! {
        () = cancel.cancelled() => return Err(LookupError::Timeout),
        body = response.bytes() => {
            body.map_err(|e| LookupError::Transport(e.to_string()))?
        }
    };

    directory.decode(&body)
}
