use anyhow::{Context, Result, bail};
use clap::Parser;
use refgen::catalog::Catalog;
use refgen::cli::Cli;
use refgen::config::RefgenConfig;
use refgen::generator::generate;
use refgen::log;
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let catalog = Catalog::from_path(&config.catalog)
        .with_context(|| format!("failed to load catalog `{}`", config.catalog.display()))?;

    if let Err(failures) = generate(Arc::new(catalog), &config.generate) {
        let total = failures.to_string();
        for failure in failures {
            log!("error"; "{:#}", anyhow::Error::from(failure));
        }
        bail!("generation failed with {total}");
    }
    Ok(())
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<RefgenConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        RefgenConfig::from_path(&config_path)?
    } else {
        RefgenConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}
