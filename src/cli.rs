// ABOUTME: Command-line interface definitions using clap
// ABOUTME: Turns flags into auth, pacing and backup configuration

use crate::api::DEFAULT_API_BASE;
use crate::auth::AuthConfig;
use crate::pacing::Pacing;
use crate::storage::DEFAULT_BACKUP_DIR;
use crate::sync::{plan_scopes, BackupOptions, Scope};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bazqux-backup")]
#[command(about = "Backup BazQux Reader items to Markdown files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// BazQux API token
    #[arg(long)]
    pub token: Option<String>,

    /// BazQux account email
    #[arg(long)]
    pub email: Option<String>,

    /// BazQux account password
    #[arg(long)]
    pub password: Option<String>,

    /// Specific tag to backup (default: backup all tags)
    #[arg(long)]
    pub tag: Option<String>,

    /// Backup starred items
    #[arg(long)]
    pub starred: bool,

    /// API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Directory the Markdown files are written to
    #[arg(long, default_value = DEFAULT_BACKUP_DIR)]
    pub output_dir: PathBuf,

    /// Disable the pause between pages (not recommended)
    #[arg(long)]
    pub no_throttle: bool,

    /// Random pause between pages in ms (min:max) instead of one second
    #[arg(long, value_parser = parse_throttle_range)]
    pub throttle_ms: Option<(u64, u64)>,

    /// Never ask for credentials interactively
    #[arg(long)]
    pub no_prompt: bool,

    /// Abort when a tag can only be fetched partially
    #[arg(long)]
    pub fail_fast: bool,

    /// Log level for diagnostics on stderr (RUST_LOG overrides)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

fn parse_throttle_range(s: &str) -> Result<(u64, u64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("Expected format: min:max".into());
    }

    let min = parts[0].parse().map_err(|_| "Invalid min value")?;
    let max = parts[1].parse().map_err(|_| "Invalid max value")?;

    if min > max {
        return Err("min must be <= max".into());
    }

    Ok((min, max))
}

impl Cli {
    pub fn auth_config(&self, env_token: Option<String>) -> AuthConfig {
        AuthConfig::from_sources(
            self.email.clone(),
            self.password.clone(),
            self.token.clone(),
            env_token,
            !self.no_prompt,
        )
    }

    pub fn pacing(&self) -> Pacing {
        if self.no_throttle {
            Pacing::None
        } else if let Some((min_ms, max_ms)) = self.throttle_ms {
            Pacing::Jitter { min_ms, max_ms }
        } else {
            Pacing::default()
        }
    }

    pub fn scopes(&self) -> Vec<Scope> {
        plan_scopes(self.tag.clone(), self.starred)
    }

    pub fn backup_options(&self) -> BackupOptions {
        BackupOptions {
            fail_fast: self.fail_fast,
        }
    }
}
