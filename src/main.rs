//! `nbgallery` - prepare notebook tutorials for deployment

use clap::Parser;

use nbgallery::cli::args::Cli;
use nbgallery::cli::commands;
use nbgallery::error::ExitCode;
use nbgallery::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.log_format, cli.verbose, cli.quiet, cli.color);

    // A signal drops the running action; dropping it kills the jupyter
    // child (`kill_on_drop`) and restores the working directory.
    let code = tokio::select! {
        result = commands::dispatch(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                e.exit_code()
            }
        },
        code = shutdown_signal() => {
            tracing::warn!(code, "interrupted, stopping");
            code
        }
    };

    std::process::exit(code);
}

/// Resolves with the exit code for the first SIGINT or SIGTERM.
async fn shutdown_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            return tokio::select! {
                _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
                _ = sigterm.recv() => ExitCode::TERMINATED,
            };
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => ExitCode::INTERRUPTED,
        // No handler could be installed; never interrupt.
        Err(_) => std::future::pending().await,
    }
}
