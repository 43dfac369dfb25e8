use clap::Parser;
use tracing::info;

use todo_probe::{logging, Cli};

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);
    info!(base_url = %cli.base_url, strict = cli.strict, "starting probe");

    let mut out = std::io::stdout().lock();
    let outcome = todo_probe::run(&cli, &mut out);

    // Failures were already reported on stdout; the exit status stays 0.
    match outcome.failed_step() {
        None => info!("all steps completed"),
        Some(step) => info!(step = step.number(), "probe stopped early"),
    }
}
