use crate::game_logic::errors::{CtfError, CtfResult};
use crate::resources::GameConfig;
use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub mod range_types;

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("tankctf");
        fs::create_dir_all(&path).ok()?;
        path.push("config.toml");
        Some(path)
    })
}

/// Load the user config, falling back to defaults when it is missing or unreadable
pub fn load_config() -> GameConfig {
    let Some(config_path) = get_config_path() else {
        return GameConfig::default();
    };

    match load_config_from(&config_path) {
        Ok(config) => config,
        Err(CtfError::ConfigFileNotFound { .. }) => GameConfig::default(),
        Err(err) => {
            warn!("Ignoring config at {}: {err}", config_path.display());
            GameConfig::default()
        }
    }
}

pub fn load_config_from(path: &Path) -> CtfResult<GameConfig> {
    if !path.exists() {
        return Err(CtfError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str::<GameConfig>(&contents)?)
}

pub fn save_config(config: &GameConfig) -> CtfResult<PathBuf> {
    let config_path = get_config_path().ok_or(CtfError::ConfigDirNotFound)?;
    save_config_to(config, &config_path)?;
    Ok(config_path)
}

pub fn save_config_to(config: &GameConfig, path: &Path) -> CtfResult<()> {
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_logic::damage::FireCooldown;

    #[test]
    fn test_missing_config_file_is_reported() {
        let path = std::env::temp_dir().join("tankctf-missing-config-test.toml");
        let _ = fs::remove_file(&path);

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, CtfError::ConfigFileNotFound { .. }));
    }

    #[test]
    fn test_save_then_load_config() {
        let path = std::env::temp_dir().join(format!("tankctf-config-{}.toml", std::process::id()));
        let mut config = GameConfig::default();
        config.settings.map_name = "map1".to_string();
        config.settings.round_limit = 3;

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.settings.map_name, "map1");
        assert_eq!(loaded.settings.round_limit, 3);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let path = std::env::temp_dir().join(format!("tankctf-bad-{}.toml", std::process::id()));
        fs::write(&path, "settings = 12").unwrap();

        let err = load_config_from(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, CtfError::DeserializationFailed(_)));
    }

    #[test]
    fn test_out_of_range_config_is_clamped() {
        let path = std::env::temp_dir().join(format!("tankctf-range-{}.toml", std::process::id()));
        fs::write(
            &path,
            "[settings]\ntick_rate = 0.0\nfire_rate = 0.0\nai_arrival_distance = -3.0\n",
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        let _ = fs::remove_file(&path);

        let settings = loaded.settings;
        assert_eq!(settings.tick_rate.get(), 10.0);
        assert_eq!(settings.fire_rate.get(), 0.1);
        assert_eq!(settings.ai_arrival_distance.get(), 0.01);
        let cooldown = FireCooldown::new(settings.tick_rate.get(), settings.fire_rate.get());
        assert_eq!(cooldown.period(), 100);
    }
}
