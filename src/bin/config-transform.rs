//! Command-line entry point.
//!
//! ```sh
//! config-transform --source site.zip --destination site.release.zip \
//!     --transform '**/*.config' --transform '**/*.json' \
//!     --delete logs --name Release
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use config_transform::{PackageTransformer, TransformArgs, TransformError};

/// Apply environment-specific overlays to the configuration files of a package.
#[derive(Parser, Debug)]
#[command(name = "config-transform", version)]
struct Cli {
    #[command(flatten)]
    transform: TransformArgs,
}

fn run(cli: Cli) -> Result<(), TransformError> {
    let settings = cli.transform.settings_loader().load()?;
    let options = cli.transform.options(&settings);
    let request = cli.transform.into_request();
    PackageTransformer::new().transform(&request, &options)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
