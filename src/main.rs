//! speedtest-asn - Main CLI Application
//!
//! Prints one CSV row per run; diagnostics and errors go to stderr.

use clap::Parser;
use speedtest_asn::{
    build_info,
    cli::{usage_error, Cli},
    error::Result,
    logging::Logger,
    App, SystemCommandRunner, PKG_NAME, VERSION,
};
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Error: application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(clap_error) => match usage_error(&clap_error) {
            Some(e) => {
                eprintln!("{}", e.format_for_console(false));
                process::exit(e.exit_code());
            }
            None => clap_error.exit(),
        },
    };

    if let Err(e) = run_application(&cli).await {
        eprintln!("{}", e.format_for_console(cli.use_colors()));
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: &Cli) -> Result<()> {
    let logger = Logger::for_session("speedtest-asn", &cli.log_settings()).await;

    logger
        .debug(&format!("{} v{}", PKG_NAME, VERSION))
        .field("build_time", build_info::BUILD_TIME)
        .field("git_commit", build_info::GIT_COMMIT)
        .field("target", build_info::TARGET_TRIPLE)
        .log()
        .await;

    let app = App::new(SystemCommandRunner::new(), logger);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app.run(&mut out).await?;

    Ok(())
}
