use anyhow::{bail, Context, Result};
use midimap::layout::Layout;
use std::{fs, path::Path};

/// Fail with "`<kind>` not found: `<path>`" unless the file exists
pub fn require_file(path: &Path, kind: &str) -> Result<()> {
    if !path.is_file() {
        bail!("{kind} not found: {}", path.display());
    }

    Ok(())
}

/// The default layout, with any fields from the TOML config file on top
pub fn load_layout(config: Option<&Path>) -> Result<Layout> {
    match config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Could not parse config file {}", path.display()))
        }
        None => Ok(Layout::default()),
    }
}

/// The last component of a path, for short progress messages
pub fn file_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.toml");
        fs::write(
            &path,
            "command_label = \"Command\"\ncommand_fallback = 1\nbackup_suffix = \".orig\"\n",
        )
        .unwrap();

        let layout = load_layout(Some(&path)).unwrap();
        assert_eq!(layout.command_label, "Command");
        assert_eq!(layout.command_fallback, 1);
        assert_eq!(layout.backup_suffix, ".orig");

        // Everything else keeps its default
        assert_eq!(layout.shift_notes_label, Layout::default().shift_notes_label);
    }

    #[test]
    fn layout_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.toml");
        fs::write(&path, "no_such_field = 1\n").unwrap();

        assert!(load_layout(Some(&path)).is_err());
        assert!(load_layout(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(load_layout(None).unwrap(), Layout::default());
    }

    #[test]
    fn missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");

        let error = require_file(&path, "CSV").unwrap_err();
        assert_eq!(error.to_string(), format!("CSV not found: {}", path.display()));

        fs::write(&path, "").unwrap();
        assert!(require_file(&path, "CSV").is_ok());
        assert!(require_file(dir.path(), "CSV").is_err());
    }

    #[test]
    fn file_names() {
        assert_eq!(file_name(Path::new("a/b/mapping.csv")), "mapping.csv");
        assert_eq!(file_name(Path::new("..")), "..");
    }
}
