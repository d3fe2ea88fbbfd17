//! shipyard binary entry point.

use std::process::ExitCode;

use shipyard::cli::{self, Cli};
use tracing_subscriber::prelude::*;

/// Initialize tracing on stderr, keeping stdout for command output.
fn init_tracing(debug: bool) {
    let default = if debug { "shipyard=debug" } else { "shipyard=info" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            shipyard::ui::output::error(&err);
            for cause in err.chain().skip(1) {
                eprintln!("  caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
