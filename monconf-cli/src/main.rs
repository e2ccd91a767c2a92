//! monconf - manage monitoring backends and instances in their INI files

mod commands;
mod entity;
pub mod error;
mod report;
mod settings;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use commands::Context;
use entity::EntityKind;
use error::CliError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "monconf")]
#[command(about = "Edit monitoring backend and instance configuration, keeping comments intact")]
#[command(version)]
struct Cli {
    /// Directory holding backends.ini, instances.ini and config.ini
    #[arg(long, global = true, env = "MONCONF_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Settings file (default: ~/.monconf/settings.toml)
    #[arg(long, global = true, env = "MONCONF_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured backends and instances
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage monitoring backends
    Backend {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage monitoring instances
    Instance {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Show or change the module's security settings
    Security {
        /// Set a key (repeatable)
        #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
        /// Remove a key (repeatable)
        #[arg(long, value_name = "KEY")]
        unset: Vec<String>,
    },
    /// Show or change front-end settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum EntityAction {
    /// Show one entry
    Show { name: String },
    /// Create a new entry
    Create {
        name: String,
        /// Key to set (repeatable)
        #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value, required = true)]
        set: Vec<(String, String)>,
    },
    /// Change or rename an existing entry
    Edit {
        name: String,
        /// New name for the entry
        #[arg(long, value_name = "NEW_NAME")]
        rename: Option<String>,
        /// Key to set (repeatable)
        #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
        /// Key to remove (repeatable)
        #[arg(long, value_name = "KEY")]
        unset: Vec<String>,
    },
    /// Remove an entry
    Remove {
        name: String,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings
    Show,
    /// Set one setting
    Set { key: String, value: String },
}

fn parse_key_value(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", arg)),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("monconf=warn,monconf_ini=warn")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Failed saves have already been reported with their preview
            if !matches!(e.downcast_ref::<CliError>(), Some(CliError::NotSaved)) {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings_path = match cli.settings {
        Some(path) => path,
        None => settings::settings_file().context("Failed to locate settings file")?,
    };
    let ctx = Context::load(settings_path, cli.config_dir);

    match cli.command {
        Commands::List { json } => commands::list(&ctx, json)?,
        Commands::Backend { action } => entity_action(&ctx, EntityKind::Backend, action)?,
        Commands::Instance { action } => entity_action(&ctx, EntityKind::Instance, action)?,
        Commands::Security { set, unset } => commands::security(&ctx, set, unset)?,
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings_show(&ctx)?,
            SettingsAction::Set { key, value } => commands::settings_set(&ctx, &key, &value)?,
        },
    }
    Ok(())
}

fn entity_action(ctx: &Context, kind: EntityKind, action: EntityAction) -> error::Result<()> {
    match action {
        EntityAction::Show { name } => commands::show(ctx, kind, &name),
        EntityAction::Create { name, set } => commands::create(ctx, kind, &name, set),
        EntityAction::Edit {
            name,
            rename,
            set,
            unset,
        } => commands::edit(ctx, kind, &name, rename, set, unset),
        EntityAction::Remove { name, yes } => commands::remove(ctx, kind, &name, yes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("path=/var/run/icinga2/cmd/icinga2.cmd").unwrap(),
            (
                "path".to_string(),
                "/var/run/icinga2/cmd/icinga2.cmd".to_string()
            )
        );
        assert_eq!(
            parse_key_value("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_key_value("empty=").unwrap().1, "");
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_parse_edit_command() {
        let cli = Cli::try_parse_from([
            "monconf",
            "backend",
            "edit",
            "ido",
            "--rename",
            "primary",
            "--set",
            "resource=db2",
            "--unset",
            "disabled",
        ])
        .unwrap();
        match cli.command {
            Commands::Backend {
                action:
                    EntityAction::Edit {
                        name,
                        rename,
                        set,
                        unset,
                    },
            } => {
                assert_eq!(name, "ido");
                assert_eq!(rename.as_deref(), Some("primary"));
                assert_eq!(set, vec![("resource".to_string(), "db2".to_string())]);
                assert_eq!(unset, vec!["disabled".to_string()]);
            }
            _ => panic!("expected backend edit"),
        }
    }

    #[test]
    fn test_create_requires_set() {
        assert!(Cli::try_parse_from(["monconf", "instance", "create", "icinga"]).is_err());
    }
}
