use clap::Parser;

use evtsentry_cli::cli::Cli;
use evtsentry_cli::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match commands::run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            e.exit_code()
        }
    };

    std::process::exit(code);
}
