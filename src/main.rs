// ABOUTME: CLI entrypoint for the bazqux-backup command
// ABOUTME: Resolves a token, runs the backup and maps errors to exit codes

use bazqux_backup::{
    api::ApiClient,
    auth::{Authenticator, StdinPrompt, TOKEN_ENV_VAR},
    cli::Cli,
    logging,
    storage::BackupDir,
    sync::run_backup,
    Result,
};
use clap::Parser;
use std::env;

fn main() {
    if let Err(e) = run() {
        eprintln!("bazqux-backup: [E{}] {}", e.exit_code(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let auth_config = cli.auth_config(env::var(TOKEN_ENV_VAR).ok());
    let authenticator = Authenticator::new(Some(cli.api_base.clone()))?;
    let token = authenticator.resolve(&auth_config, &mut StdinPrompt)?;

    let client = ApiClient::new(token, Some(cli.api_base.clone()))?.with_pacer(cli.pacing());
    let dir = BackupDir::new(Some(cli.output_dir.clone()));

    let report = run_backup(&client, &dir, &cli.scopes(), &cli.backup_options())?;

    let failures: Vec<_> = report.failures().map(|s| s.name.as_str()).collect();
    if failures.is_empty() {
        println!(
            "Backup completed successfully! {} items backed up.",
            report.total_items()
        );
    } else {
        println!(
            "Backup finished with {} items; incomplete: {}",
            report.total_items(),
            failures.join(", ")
        );
    }

    Ok(())
}
