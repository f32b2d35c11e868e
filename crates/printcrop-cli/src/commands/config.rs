use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use printcrop_core::{parse_size, EditorConfig, PRESETS};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save the default EditorConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let toml_str = toml::to_string_pretty(&EditorConfig::default())?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}

pub fn list_presets() -> Result<()> {
    for (name, size) in PRESETS {
        let (w, h) = parse_size(size)?;
        println!("{:<12} {:<14} ({:.2}in x {:.2}in)", name, size, w, h);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_config;

    #[test]
    fn test_default_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printcrop.toml");
        run(&ConfigArgs {
            output: Some(path.clone()),
        })
        .unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, EditorConfig::default());
    }

    #[test]
    fn test_presets_parse() {
        assert!(list_presets().is_ok());
    }
}
