//! consulta - interactive CEP lookup racing multiple postal directories.
//!
//! The binary owns the thin IO shell: startup banner, prompt loop, input
//! validation, outcome rendering, and Ctrl-C handling. All lookup logic
//! lives in [`consulta_providers`].
//!
//! # Session Loop
//!
//! 1. Prompt for a CEP on stdout
//! 2. Race the line read against the interrupt signal
//! 3. Validate the key; invalid input re-prompts without any network call
//! 4. Resolve through [`Race`] with the configured budget, also raced
//!    against the interrupt signal so Ctrl-C lands mid-lookup too
//! 5. Render the winning backend and record, or a one-line error
//!
//! A failed or timed-out query never ends the session; only Ctrl-C or EOF
//! does, with a farewell and exit status 0.

use anyhow::Result;
use consulta_providers::lookup_timeout;
use consulta_providers::race::{Race, Win};
use consulta_types::{Cep, LookupError};
use std::future::Future;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // Diagnostics go to stderr so they never interleave with the prompt.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn farewell() {
    println!("\nExiting... Bye!");
}

/// Resolves when Ctrl-C is delivered. The listener lives only as long as
/// the await it guards.
async fn interrupt() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Race a future against the interrupt signal; `None` means interrupted.
///
/// Every await in the session loop goes through this, so a Ctrl-C delivered
/// while a lookup is resolving is acted on, not dropped.
async fn until_interrupted<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future<Output = ()>,
) -> Option<T> {
    tokio::select! {
        () = interrupt => None,
        value = work => Some(value),
    }
}

fn render(outcome: Result<Win, LookupError>) {
    match outcome {
        Ok(win) => match serde_json::to_string_pretty(&win.address) {
            Ok(rendered) => println!("API: {}\nResult:\n{rendered}", win.backend),
            Err(e) => println!("Error: {e}"),
        },
        Err(e) => println!("Error: {e}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    println!("Consulta CEP v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let race = Race::with_public_directories();
    let timeout = lookup_timeout();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("Enter CEP (or press CTRL+C to exit): ");
        io::stdout().flush()?;

        let Some(line) = until_interrupted(lines.next_line(), interrupt()).await else {
            farewell();
            return Ok(());
        };

        // EOF on stdin ends the session the same way an interrupt does.
        let Some(line) = line? else {
            farewell();
            return Ok(());
        };

        let cep = match Cep::parse(&line) {
            Ok(cep) => cep,
            Err(e) => {
                tracing::debug!(%e, "rejected input before dispatch");
                println!("Invalid CEP. Please enter an 8-digit CEP.");
                continue;
            }
        };

        let Some(outcome) = until_interrupted(race.resolve(&cep, timeout), interrupt()).await
        else {
            farewell();
            return Ok(());
        };
        render(outcome);
    }
}
