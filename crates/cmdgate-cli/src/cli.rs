//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// cmdgate - validate commands against a service description
///
/// Filters, validates and defaults the parameters of a command exactly as the
/// validation gate would before handing it to a transport.
#[derive(Parser, Debug)]
#[command(
    name = "cmdgate",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CMDGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human, or `output.format` from the config]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command through the validation gate and print the normalized parameters
    Validate(ValidateArgs),

    /// List the operations of a description, or the parameters of one operation
    Describe(DescribeArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Description file, or a description name looked up in the descriptions directory
    #[arg(value_name = "DESCRIPTION")]
    pub description: String,

    /// Operation to validate the parameters for
    #[arg(value_name = "OPERATION")]
    pub operation: String,

    /// JSON or YAML file holding the parameter object
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Set one parameter; the value is parsed as JSON, falling back to a plain string
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub param: Vec<String>,

    /// Write additional parameters back using the last declared parameter's filters
    #[arg(long)]
    pub legacy_write_back: bool,

    /// Show the submitted parameters alongside the result
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the describe command
#[derive(Parser, Debug)]
pub struct DescribeArgs {
    /// Description file, or a description name looked up in the descriptions directory
    #[arg(value_name = "DESCRIPTION")]
    pub description: String,

    /// Show the parameters of this operation only
    #[arg(value_name = "OPERATION")]
    pub operation: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Write the user config instead of the project config (.cmdgate.toml)
    #[arg(long)]
    pub user: bool,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,

    /// Directory searched for description names
    #[arg(long, value_name = "DIR")]
    pub descriptions_dir: Option<PathBuf>,

    /// Reject integers where a schema expects only a string
    #[arg(long)]
    pub strict_strings: bool,

    /// Enable the legacy write-back policy for additional parameters
    #[arg(long)]
    pub legacy_write_back: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

impl OutputFormat {
    /// Parse the `output.format` config value
    pub fn from_config(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_validate_arguments() {
        let cli = Cli::parse_from([
            "cmdgate",
            "validate",
            "storage.yaml",
            "PutObject",
            "-p",
            "Bucket=photos",
            "--param",
            "Tags=[\"a\"]",
            "--legacy-write-back",
        ]);

        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.description, "storage.yaml");
                assert_eq!(args.operation, "PutObject");
                assert_eq!(args.param, vec!["Bucket=photos", "Tags=[\"a\"]"]);
                assert!(args.legacy_write_back);
                assert!(!args.detailed);
                assert!(args.params.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_describe_operation_is_optional() {
        let cli = Cli::parse_from(["cmdgate", "describe", "storage"]);
        match cli.command {
            Commands::Describe(args) => assert!(args.operation.is_none()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["cmdgate", "-vv", "describe", "storage"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["cmdgate", "--quiet", "describe", "storage"]);
        assert_eq!(cli.verbosity_level(), 0);

        assert!(Cli::try_parse_from(["cmdgate", "-q", "-v", "describe", "storage"]).is_err());
    }

    #[test]
    fn test_output_format_from_config() {
        assert_eq!(OutputFormat::from_config("json-pretty"), Some(OutputFormat::JsonPretty));
        assert_eq!(OutputFormat::from_config("YAML"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_config("xml"), None);
    }
}
