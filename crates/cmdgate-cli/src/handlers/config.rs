//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::{Config, ConfigBuilder, PROJECT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::{Path, PathBuf};

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
    }
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = if args.user {
        Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?
    } else {
        PathBuf::from(PROJECT_CONFIG_FILE)
    };

    let mut builder = ConfigBuilder::new()
        .cast_integer_to_string(!args.strict_strings)
        .legacy_additional_write_back(args.legacy_write_back);
    if let Some(dir) = args.descriptions_dir {
        builder = builder.descriptions_dir(dir);
    }

    if write_config(&builder.build(), &path, args.force)? {
        output.success(&format!("✓ Created config at {}", path.display()))?;
        output.info("Edit it to customize settings for your environment.")?;
    } else {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
    }

    Ok(())
}

/// Write the config unless a file is already there. Returns whether it was written.
fn write_config(config: &Config, path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    config.save(path)?;
    Ok(true)
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = render_config(config, args.format)?;
    output.writeln(content.trim_end())
}

fn render_config(config: &Config, format: ConfigFormat) -> Result<String> {
    let content = match format {
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_does_not_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "[output]\nformat = \"json\"\n").unwrap();

        let config = ConfigBuilder::new().legacy_additional_write_back(true).build();
        assert!(!write_config(&config, &path, false).unwrap());
        assert_eq!(Config::from_file(&path).unwrap().output.format, "json");

        assert!(write_config(&config, &path, true).unwrap());
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_render_each_format() {
        let config = ConfigBuilder::new().descriptions_dir("/srv/descriptions").build();

        let toml = render_config(&config, ConfigFormat::Toml).unwrap();
        assert!(toml.contains("[validation]"));
        assert!(toml.contains("descriptions_dir = \"/srv/descriptions\""));

        let json: serde_json::Value =
            serde_json::from_str(&render_config(&config, ConfigFormat::Json).unwrap()).unwrap();
        assert_eq!(json["validation"]["cast_integer_to_string"], serde_json::json!(true));

        let yaml = render_config(&config, ConfigFormat::Yaml).unwrap();
        assert!(yaml.contains("legacy_additional_write_back: false"));
    }
}
