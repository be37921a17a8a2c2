//! One-off tier reconciliation, for cron jobs and after bulk imports.
//!
//! Exits non-zero when any organization could not be reconciled.

use anyhow::{Context, bail};
use clap::Parser;
use env_logger::Env;

use omnily_loyalty::{
    config::Config,
    database::create_pool,
    services::{OrganizationService, ReconciliationService},
};

#[derive(Parser, Debug)]
#[command(name = "reconcile-tiers", about = "Rewrite stored customer tiers that disagree with their points")]
struct Cli {
    /// Report drift without writing corrections
    #[arg(long)]
    dry_run: bool,

    /// Only reconcile the organization with this slug
    #[arg(long, value_name = "SLUG")]
    organization: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("loading configuration")?;
    let pool = create_pool(&config.database)
        .await
        .context("connecting to the database")?;
    let reconciliation = ReconciliationService::new(pool.clone());

    match cli.organization {
        Some(slug) => {
            let org = OrganizationService::new(pool)
                .get_by_slug(&slug)
                .await
                .with_context(|| format!("looking up organization '{slug}'"))?;
            let report = reconciliation
                .reconcile_organization(org.id, cli.dry_run)
                .await
                .with_context(|| format!("reconciling organization '{slug}'"))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => {
            let summary = reconciliation
                .reconcile_all(cli.dry_run)
                .await
                .context("reconciling organizations")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if !summary.failed_organizations.is_empty() {
                bail!(
                    "{} organization(s) have an unusable tier configuration",
                    summary.failed_organizations.len()
                );
            }
        }
    }

    Ok(())
}
