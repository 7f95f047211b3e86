use clap::Parser;
use colored::*;
use serde_json::json;
use std::sync::Arc;
use crate::cli::{CliArgs, Commands, OutputFormat, OutputFormatter};
use crate::factory::ConnectionFactory;
use crate::registry::DriverRegistry;
use crate::utils::{
    config::LogConfig,
    error::{FactoryError, FactoryResult},
    logging::init_logging,
    types::DriverReference,
};

/// Runs CLI commands against a driver registry
pub struct CliRunner {
    factory: ConnectionFactory,
    format: OutputFormat,
}

impl CliRunner {
    /// Create a runner over the process-wide registry
    pub fn new(format: OutputFormat) -> Self {
        Self::with_registry(DriverRegistry::global(), format)
    }

    pub fn with_registry(registry: Arc<DriverRegistry>, format: OutputFormat) -> Self {
        Self {
            factory: ConnectionFactory::new(registry),
            format,
        }
    }

    fn registry(&self) -> &DriverRegistry {
        self.factory.registry()
    }

    /// List known providers
    pub fn list_providers(&self, detailed: bool) -> String {
        match self.format {
            OutputFormat::Text => OutputFormatter::format_providers(self.registry(), detailed),
            OutputFormat::Json => OutputFormatter::providers_json(self.registry()).to_string(),
        }
    }

    /// Resolve a provider name or alias and describe the driver
    pub fn resolve_provider(&self, name: &str) -> FactoryResult<String> {
        let (provider, driver) = self.registry().resolve_name(name)?;

        Ok(match self.format {
            OutputFormat::Text => format!("{} {} {} {}",
                "Resolved".green().bold(),
                name.cyan(),
                "→".dimmed(),
                format!("{} ({})", provider, driver.name()).bold()
            ),
            OutputFormat::Json => OutputFormatter::resolution_json(provider, driver.name()).to_string(),
        })
    }

    /// Materialize a `"Type.Name, Origin"` reference without going through a provider
    pub fn load_reference(&self, qualified: &str) -> FactoryResult<String> {
        let reference: DriverReference = qualified.parse()?;
        let driver = self.registry().loader().materialize(&reference)?;

        Ok(match self.format {
            OutputFormat::Text => OutputFormatter::format_success(&format!("Loaded {} as {}",
                reference, driver.name())),
            OutputFormat::Json => json!({
                "reference": reference,
                "driver": driver.name(),
            }).to_string(),
        })
    }

    /// Create a connection, optionally opening and closing it again
    pub async fn connect(&self, name: &str, connection_string: &str, open: bool) -> FactoryResult<String> {
        let mut handle = self.factory.create_by_name(name, connection_string)?;
        let driver_name = handle.driver().name().to_string();

        if open {
            if self.format == OutputFormat::Text {
                eprintln!("{}", OutputFormatter::format_info(&format!("Opening {} connection via {}",
                    handle.provider(), driver_name)));
            }
            handle.open().await?;
            handle.close().await?;
        }

        Ok(match self.format {
            OutputFormat::Text => {
                let action = if open { "opened and closed" } else { "created (not opened)" };
                OutputFormatter::format_success(&format!("{} connection via {} {}",
                    handle.provider(), driver_name, action))
            }
            OutputFormat::Json => json!({
                "provider": handle.provider(),
                "driver": driver_name,
                "opened": open,
                "state": handle.state(),
            }).to_string(),
        })
    }

    fn print_error(&self, error: &FactoryError) {
        match self.format {
            OutputFormat::Text => eprintln!("{}", OutputFormatter::format_error(error)),
            OutputFormat::Json => eprintln!("{}", OutputFormatter::error_json(error)),
        }
    }
}

/// Main entry point for CLI execution
pub async fn run_cli() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    init_logging(&LogConfig {
        level: args.log_level.clone(),
        file: None,
    });

    let runner = CliRunner::new(args.format);

    let result = match args.command {
        Commands::Providers { detailed } => Ok(runner.list_providers(detailed)),
        Commands::Resolve { provider } => runner.resolve_provider(&provider),
        Commands::Load { reference } => runner.load_reference(&reference),
        Commands::Connect { provider, connection_string, open } => {
            runner.connect(&provider, &connection_string, open).await
        }
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            runner.print_error(&e);
            std::process::exit(1);
        }
    }
}
