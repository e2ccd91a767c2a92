//! Command implementations for the `monconf` front-end

use crate::entity::EntityKind;
use crate::error::{CliError, Result};
use crate::report;
use crate::settings::{self, Settings};
use dialoguer::Confirm;
use indexmap::IndexMap;
use monconf_ini::{list_entities, persist, EditIntent, LoadError, SectionMap};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Section of the module file holding security settings
pub const SECURITY_SECTION: &str = "security";

/// Resolved settings plus where they came from
pub struct Context {
    pub settings: Settings,
    pub settings_path: PathBuf,
}

impl Context {
    /// Load settings from `settings_path`, optionally overriding the config directory
    pub fn load(settings_path: PathBuf, config_dir: Option<PathBuf>) -> Self {
        let mut settings = Settings::load_or_default(&settings_path);
        if let Some(dir) = config_dir {
            settings.config_dir = dir;
        }
        debug!("Using config directory {}", settings.config_dir.display());
        Self {
            settings,
            settings_path,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Listing<'a> {
    Entities(&'a SectionMap),
    Unreadable { error: String },
}

/// List backends and instances
///
/// A file that cannot be read is reported in place of its listing; the
/// other file is still shown.
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let results: Vec<(EntityKind, PathBuf, std::result::Result<SectionMap, LoadError>)> =
        EntityKind::all()
            .iter()
            .map(|&kind| {
                let path = ctx.settings.file_for(kind);
                let result = list_entities(&path);
                (kind, path, result)
            })
            .collect();

    if json {
        let listing: IndexMap<&str, Listing<'_>> = results
            .iter()
            .map(|(kind, _, result)| {
                let entry = match result {
                    Ok(map) => Listing::Entities(map),
                    Err(e) => Listing::Unreadable {
                        error: e.to_string(),
                    },
                };
                (kind.plural(), entry)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let mut first = true;
    for (kind, path, result) in &results {
        if !first {
            println!();
        }
        first = false;
        print!("{}", report::listing(*kind, path, result));
    }
    Ok(())
}

/// Print one entity
pub fn show(ctx: &Context, kind: EntityKind, name: &str) -> Result<()> {
    let entries = existing(ctx, kind, name, "show")?;
    print!("{}", report::entity(name, &entries, ""));
    Ok(())
}

/// Create a new entity from `key=value` pairs
pub fn create(
    ctx: &Context,
    kind: EntityKind,
    name: &str,
    set: Vec<(String, String)>,
) -> Result<()> {
    let path = ctx.settings.file_for(kind);
    save(&path, EditIntent::create(name, set), kind.created(name))
}

/// Edit an existing entity, optionally renaming it
///
/// The new entry set is the current one with `unset` keys removed and `set`
/// pairs applied on top.
pub fn edit(
    ctx: &Context,
    kind: EntityKind,
    name: &str,
    rename: Option<String>,
    set: Vec<(String, String)>,
    unset: Vec<String>,
) -> Result<()> {
    let mut entries = existing(ctx, kind, name, "edit")?;
    merge_changes(&mut entries, set, unset);

    let new_name = rename.unwrap_or_else(|| name.to_string());
    let path = ctx.settings.file_for(kind);
    save(
        &path,
        EditIntent::update(name, new_name, entries),
        kind.modified(name),
    )
}

/// Remove an entity after confirmation
pub fn remove(ctx: &Context, kind: EntityKind, name: &str, yes: bool) -> Result<()> {
    existing(ctx, kind, name, "remove")?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove {} \"{}\"?", kind, name))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let path = ctx.settings.file_for(kind);
    save(&path, EditIntent::remove(name), kind.removed(name))
}

/// Show or change the `[security]` section of the module file
///
/// The section is created on the first save that leaves it with entries.
pub fn security(ctx: &Context, set: Vec<(String, String)>, unset: Vec<String>) -> Result<()> {
    let path = ctx.settings.module_file();
    let current = list_entities(&path)?.shift_remove(SECURITY_SECTION);

    if set.is_empty() && unset.is_empty() {
        match current {
            Some(entries) => print!("{}", report::entity(SECURITY_SECTION, &entries, "")),
            None => println!("No security settings configured."),
        }
        return Ok(());
    }

    let intent = match current {
        Some(mut entries) => {
            merge_changes(&mut entries, set, unset);
            EditIntent::update(SECURITY_SECTION, SECURITY_SECTION, entries)
        }
        None => {
            let mut entries = IndexMap::new();
            merge_changes(&mut entries, set, unset);
            if entries.is_empty() {
                println!("No security settings configured.");
                return Ok(());
            }
            EditIntent::create(SECURITY_SECTION, entries)
        }
    };
    save(
        &path,
        intent,
        "Security settings successfully saved.".to_string(),
    )
}

/// Print the effective settings
pub fn settings_show(ctx: &Context) -> Result<()> {
    println!("# {}", ctx.settings_path.display());
    print!("{}", toml::to_string_pretty(&ctx.settings)?);
    Ok(())
}

/// Change one key in the settings file
pub fn settings_set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    settings::set_value(&ctx.settings_path, key, value)?;
    println!("Setting \"{}\" saved to {}.", key, ctx.settings_path.display());
    Ok(())
}

/// Current entries of `name`, or a not-found error mentioning `action`
fn existing(
    ctx: &Context,
    kind: EntityKind,
    name: &str,
    action: &str,
) -> Result<IndexMap<String, String>> {
    let path = ctx.settings.file_for(kind);
    list_entities(&path)?
        .shift_remove(name)
        .ok_or_else(|| CliError::NotFound(kind.not_found(action, name)))
}

fn merge_changes(
    entries: &mut IndexMap<String, String>,
    set: Vec<(String, String)>,
    unset: Vec<String>,
) {
    for key in unset {
        entries.shift_remove(&key);
    }
    for (key, value) in set {
        entries.insert(key, value);
    }
}

/// Persist `intent` and announce the outcome
fn save(path: &Path, intent: EditIntent, success: String) -> Result<()> {
    match persist(path, intent) {
        Ok(()) => {
            println!("{}", success);
            Ok(())
        }
        Err(failure) => {
            eprint!("{}", report::failure(&failure));
            Err(CliError::NotSaved)
        }
    }
}
