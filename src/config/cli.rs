use crate::config::toml_config::ExchangeConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "points-exchange")]
#[command(about = "Interactive loyalty-points product exchange")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Catalog file (HTML markup or JSON); overrides catalog.path
    #[arg(long)]
    pub catalog: Option<String>,

    /// Fallback budget when the catalog shows none; overrides budget.available_points
    #[arg(long)]
    pub budget: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Load config and catalog, print them, and exit
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Command line values win over the configuration file.
    pub fn apply_to(&self, config: &mut ExchangeConfig) {
        if let Some(path) = &self.catalog {
            config.catalog.path = Some(path.clone());
        }
        if let Some(budget) = self.budget {
            config.budget.available_points = Some(budget);
        }
    }
}
