//! Factory preset commands.

use clap::{Args, Subcommand};
use darvaza_config::{ConfigError, ParamId, Preset, factory_preset_names, get_factory_preset};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List factory presets
    List,

    /// Show the parameter values of a preset
    Show {
        /// Factory preset id or name, or a path to a preset file
        name: String,

        /// Print the preset as TOML instead of a table
        #[arg(long)]
        toml: bool,
    },

    /// Write a factory preset to a file for editing
    Export {
        /// Factory preset id or name
        name: String,

        /// Destination TOML file
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List => list_presets(),
        PresetsCommand::Show { name, toml } => show_preset(&name, toml),
        PresetsCommand::Export {
            name,
            output,
            force,
        } => export_preset(&name, &output, force),
    }
}

fn list_presets() -> anyhow::Result<()> {
    println!("Factory Presets:");
    println!("================");
    for id in factory_preset_names() {
        if let Some(preset) = get_factory_preset(id) {
            let desc = preset.description.as_deref().unwrap_or("");
            println!("  {:16} {:18} - {}", id, preset.name, desc);
        }
    }
    println!();
    println!("Render with: darvaza process in.wav out.wav --factory <id>");
    Ok(())
}

fn find_preset(name: &str) -> anyhow::Result<Preset> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }

    let path = PathBuf::from(name);
    if path.exists() {
        return Ok(Preset::load(&path)?);
    }

    Err(ConfigError::PresetNotFound(name.to_string()).into())
}

fn show_preset(name: &str, as_toml: bool) -> anyhow::Result<()> {
    let preset = find_preset(name)?;

    if as_toml {
        print!("{}", preset.to_toml()?);
        return Ok(());
    }

    println!("Preset: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len()));
    if let Some(desc) = &preset.description {
        println!("{}", desc);
    }
    println!();

    for id in ParamId::ALL {
        let value = preset.params.get(id);
        let marker = if value == id.default_value() { "" } else { " *" };
        println!("  {:8} {:18} {:.3}{}", id.label(), id.name(), value, marker);
    }
    println!(
        "  {:8} {:18} {}",
        "Bypass",
        "bypass",
        if preset.params.bypass { "on" } else { "off" }
    );

    Ok(())
}

fn export_preset(name: &str, output: &Path, force: bool) -> anyhow::Result<()> {
    let preset = get_factory_preset(name)
        .ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))?;

    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            output.display()
        );
    }

    preset.save(output)?;
    println!("Exported '{}' to {}", preset.name, output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_preset_by_id_and_path() {
        assert_eq!(find_preset("choir").map(|p| p.name).ok(), get_factory_preset("choir").map(|p| p.name));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mine.toml");
        Preset::new("Mine").save(&path).unwrap();
        let loaded = find_preset(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.name, "Mine");

        assert!(find_preset("no_such_preset").is_err());
    }

    #[test]
    fn test_export_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("choir.toml");

        export_preset("choir", &path, false).unwrap();
        assert!(export_preset("choir", &path, false).is_err());
        export_preset("choir", &path, true).unwrap();

        let loaded = Preset::load(&path).unwrap();
        assert_eq!(Some(loaded.params), get_factory_preset("choir").map(|p| p.params));
    }
}
