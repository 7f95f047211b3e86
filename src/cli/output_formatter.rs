use colored::*;
use serde_json::{json, Value as JsonValue};
use crate::registry::DriverRegistry;
use crate::utils::{
    error::FactoryError,
    types::{ProviderType, ResolutionState},
};

/// Formats registry and connection information for CLI output
pub struct OutputFormatter;

impl OutputFormatter {
    /// Provider listing as colored text
    pub fn format_providers(registry: &DriverRegistry, detailed: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Known Providers:".bold()));

        for entry in &registry.catalog().entries {
            let state = registry.state(entry.provider);
            let builtin = if registry.is_builtin(entry.provider) { " (built-in)".dimmed().to_string() } else { String::new() };
            output.push_str(&format!("  {} {} {}{}\n",
                "•".green(),
                entry.provider.name().cyan().bold(),
                Self::format_state(state),
                builtin
            ));

            if detailed {
                output.push_str(&format!("    Aliases: {}\n", entry.aliases.join(", ").yellow()));
                for (i, candidate) in entry.candidates.iter().enumerate() {
                    output.push_str(&format!("    {}. {}\n", i + 1, candidate));
                }
            }
        }

        output
    }

    /// Provider listing as JSON
    pub fn providers_json(registry: &DriverRegistry) -> JsonValue {
        let providers: Vec<JsonValue> = registry.catalog().entries.iter()
            .map(|entry| json!({
                "provider": entry.provider,
                "state": registry.state(entry.provider),
                "builtin": registry.is_builtin(entry.provider),
                "aliases": entry.aliases,
                "candidates": entry.candidates,
            }))
            .collect();
        json!({ "providers": providers })
    }

    /// Description of a resolved provider
    pub fn resolution_json(provider: ProviderType, driver_name: &str) -> JsonValue {
        json!({
            "provider": provider,
            "driver": driver_name,
        })
    }

    fn format_state(state: ResolutionState) -> ColoredString {
        match state {
            ResolutionState::Resolved => "resolved".green(),
            ResolutionState::Unavailable => "unavailable".red(),
            ResolutionState::Resolving => "resolving".yellow(),
            ResolutionState::Unresolved => "unresolved".dimmed(),
        }
    }

    /// Format error message for CLI display
    pub fn format_error(error: &FactoryError) -> String {
        format!("{} {}", "Error:".red().bold(), error.to_string().red())
    }

    /// Format error as JSON, keeping the attempted candidates machine-readable
    pub fn error_json(error: &FactoryError) -> JsonValue {
        match error {
            FactoryError::ProviderUnavailable { provider, attempted } => json!({
                "error": "provider_unavailable",
                "provider": provider,
                "attempted": attempted,
                "message": error.to_string(),
            }),
            FactoryError::UnsupportedProvider { name } => json!({
                "error": "unsupported_provider",
                "name": name,
                "message": error.to_string(),
            }),
            FactoryError::MissingConnectionString => json!({
                "error": "missing_connection_string",
                "message": error.to_string(),
            }),
            _ => json!({
                "error": "failure",
                "message": error.to_string(),
            }),
        }
    }

    /// Format success message for CLI display
    pub fn format_success(message: &str) -> String {
        format!("{} {}", "Success:".green().bold(), message)
    }

    /// Format info message for CLI display
    pub fn format_info(message: &str) -> String {
        format!("{} {}", "Info:".blue().bold(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::types::DriverReference;

    #[test]
    fn test_format_providers_lists_every_entry() {
        let registry = DriverRegistry::with_defaults();
        let output = OutputFormatter::format_providers(&registry, true);

        for provider in ProviderType::all() {
            assert!(output.contains(provider.name()));
        }
        assert!(output.contains("Npgsql.NpgsqlFactory, Npgsql"));
        assert!(output.contains("microsoft.data.sqlite"));
    }

    #[test]
    fn test_providers_json_marks_builtin() {
        let registry = DriverRegistry::with_defaults();
        let json = OutputFormatter::providers_json(&registry);

        let providers = json["providers"].as_array().unwrap();
        assert_eq!(providers.len(), 6);
        assert_eq!(providers[0]["provider"], "SqlServer");
        assert_eq!(providers[0]["builtin"], true);
        assert_eq!(providers[0]["state"], "Resolved");
        assert_eq!(providers[3]["state"], "Unresolved");
    }

    #[test]
    fn test_error_json_for_unavailable_provider() {
        let error = FactoryError::ProviderUnavailable {
            provider: ProviderType::PostgreSql,
            attempted: vec![DriverReference::with_origin("Npgsql.NpgsqlFactory", "Npgsql")],
        };
        let json = OutputFormatter::error_json(&error);

        assert_eq!(json["error"], "provider_unavailable");
        assert_eq!(json["provider"], "PostgreSql");
        assert_eq!(json["attempted"][0]["type_name"], "Npgsql.NpgsqlFactory");
        assert_eq!(json["attempted"][0]["origin_hint"], "Npgsql");
    }

    #[test]
    fn test_format_messages() {
        assert!(OutputFormatter::format_success("done").contains("done"));
        assert!(OutputFormatter::format_info("note").contains("note"));
        let error = FactoryError::MissingConnectionString;
        assert!(OutputFormatter::format_error(&error).contains("Connection string not found"));
    }
}
