//! HIDS Manager
//!
//! Entry point of the manager coordinating remote collector agents.
//!
//! # Architecture Overview
//!
//! ```text
//!   hids-manager [-key | -dump-config | -certgen [-ecdsa]] CONFIG_FILE
//!
//!   -key          security::api_key   → stdout, exit 0
//!   -dump-config  config::loader      → stdout, exit 0
//!   -certgen      config → security::certificate → cert.pem / key.pem, exit 0
//!   (default)     config → lifecycle::controller ⇄ manager::HttpManager
//!                                   ▲
//!                 lifecycle::signals (SIGINT listener task)
//! ```
//!
//! Every failure travels back here as an [`AppError`], which is logged to
//! stderr and turned into the process exit code.

use std::process::ExitCode;

use hids_manager::app::{self, AppError};
use hids_manager::cli::Cli;
use hids_manager::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init();

    match app::execute(cli.action()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(error: &AppError) -> ExitCode {
    tracing::error!(error = %error, "Fatal error");
    ExitCode::from(error.exit_code())
}
