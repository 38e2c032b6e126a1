//! Settings persistence
//!
//! Gesture settings live in `~/.config/keyecho/settings.yaml`. Loading is
//! forgiving (missing or unreadable files fall back to defaults with a
//! warning); a file that parses but fails band validation is also refused,
//! since silently classifying against nonsense thresholds is worse than
//! running on defaults.

use std::path::Path;

use crate::settings::GestureSettings;

/// Load settings from an explicit path, or the default location, or
/// defaults when neither exists.
pub fn load_settings(path: Option<&Path>) -> GestureSettings {
    let resolved = match path {
        Some(p) => Some(p.to_path_buf()),
        None => crate::config_paths::settings_file(),
    };

    let Some(path) = resolved else {
        tracing::debug!("No config directory available, using default settings");
        return GestureSettings::default();
    };

    if !path.exists() {
        tracing::debug!(
            "Settings file not found at {}, using defaults",
            path.display()
        );
        return GestureSettings::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match serde_yaml::from_str::<GestureSettings>(&content) {
            Ok(settings) => {
                let problems = settings.validate();
                if problems.is_empty() {
                    tracing::info!("Loaded settings from {}", path.display());
                    settings
                } else {
                    for problem in &problems {
                        tracing::warn!("Settings problem in {}: {}", path.display(), problem);
                    }
                    GestureSettings::default()
                }
            }
            Err(e) => {
                tracing::warn!("Failed to parse settings at {}: {}", path.display(), e);
                GestureSettings::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read settings at {}: {}", path.display(), e);
            GestureSettings::default()
        }
    }
}

/// Save settings to the default location, creating the directory if needed.
pub fn save_settings(settings: &GestureSettings) -> Result<(), String> {
    let path = crate::config_paths::settings_file()
        .ok_or_else(|| "No config directory available".to_string())?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let content = serde_yaml::to_string(settings)
        .map_err(|e| format!("Failed to serialize settings: {}", e))?;

    std::fs::write(&path, content)
        .map_err(|e| format!("Failed to write settings to {}: {}", path.display(), e))?;

    tracing::info!("Saved settings to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("nope.yaml")));
        assert_eq!(settings, GestureSettings::default());
    }

    #[test]
    fn test_explicit_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "long_press_min_ms: 90\nlong_press_max_ms: 150").unwrap();
        let settings = load_settings(Some(file.path()));
        assert_eq!(settings.long_press_min_ms, 90);
        assert_eq!(settings.long_press_max_ms, 150);
        // Unspecified fields keep their defaults.
        assert_eq!(settings.debounce_ms, GestureSettings::default().debounce_ms);
    }

    #[test]
    fn test_invalid_bands_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // super_long band overlapping the long band
        writeln!(file, "super_long_min_ms: 100").unwrap();
        let settings = load_settings(Some(file.path()));
        assert_eq!(settings, GestureSettings::default());
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ":: not yaml at all ::").unwrap();
        let settings = load_settings(Some(file.path()));
        assert_eq!(settings, GestureSettings::default());
    }
}
