use azure_nsg_provision::azure::ArmClient;
use azure_nsg_provision::cli::Args;
use azure_nsg_provision::config;
use azure_nsg_provision::output::Narrator;
use azure_nsg_provision::provision::Cancellation;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    if let Err(e) = log4rs::init_file(config::LOG_CONFIG_FILE, Default::default()) {
        eprintln!("Warning: logging disabled, could not load {}: {e}", config::LOG_CONFIG_FILE);
    }
    dotenv::dotenv().ok();
    let args = Args::parse();
    log::info!("#Start main() {args:?}");

    let narrator = Narrator::stdio(args.quiet);
    let cancel = Cancellation::new();

    cancel.listen_for_signals();

    let outcome = azure_nsg_provision::run(
        &args,
        |var| std::env::var(var).ok(),
        |credentials, location| async move { ArmClient::connect(&credentials, &location).await },
        &narrator,
        &cancel,
    )
    .await;

    let status = outcome.exit_status();
    log::info!("#End main() exit={status:?}");
    ExitCode::from(status)
}
