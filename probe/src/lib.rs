//! The `todo-probe` binary's building blocks: CLI parsing, logging setup and
//! a blocking `ureq` transport for `todo_core::ProbeRunner`.

pub mod cli;
pub mod logging;
pub mod transport;

use std::io::Write;

use todo_core::{ProbeOutcome, ProbeRunner, TodoClient};

pub use cli::Cli;
pub use transport::UreqTransport;

/// Probe the service `cli` points at, printing to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> ProbeOutcome {
    let client = TodoClient::new(&cli.base_url).with_policy(cli.status_policy());
    ProbeRunner::new(client, UreqTransport::new()).run(out)
}
