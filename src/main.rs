use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use tankctf::config::{load_config, load_config_from, save_config};
use tankctf::map::generate_random_arena;
use tankctf::plugins::{create_headless_app, run_ticks};
use tankctf::{ArenaGeneratorConfig, CtfResult, GameSettings, MapDefinition, MatchSession, Scoreboard};

#[derive(Parser, Clone)]
#[command(name = "tankctf")]
#[command(about = "Headless capture-the-flag match between autonomous tanks")]
struct Cli {
    /// Built-in map name (map0..map3); overrides the config file
    #[arg(long)]
    map: Option<String>,

    /// TOML map file; takes precedence over --map
    #[arg(long)]
    map_file: Option<PathBuf>,

    /// Play on a generated arena with this seed instead of a stored map
    #[arg(long)]
    random_seed: Option<u64>,

    /// Maximum number of simulation ticks
    #[arg(long, default_value = "15000")]
    ticks: u64,

    /// Stop after this many captured flags (0 = only the tick limit)
    #[arg(long)]
    rounds: Option<u32>,

    /// Config file to use instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to the per-user config file and exit
    #[arg(long)]
    save_config: bool,
}

fn resolve_map(cli: &Cli, settings: &GameSettings) -> CtfResult<MapDefinition> {
    if let Some(seed) = cli.random_seed {
        return generate_random_arena(ArenaGeneratorConfig {
            seed,
            ..default()
        });
    }
    if let Some(path) = cli.map_file.as_ref() {
        return MapDefinition::load_from_file(path);
    }
    if let Some(name) = cli.map.as_deref() {
        return MapDefinition::builtin(name);
    }
    if let Some(path) = settings.map_file.as_ref() {
        return MapDefinition::load_from_file(path);
    }
    MapDefinition::builtin(&settings.map_name)
}

fn main() -> CtfResult<()> {
    let cli = Cli::parse();

    let mut config = match cli.config.as_ref() {
        Some(path) => load_config_from(path)?,
        None => load_config(),
    };
    if let Some(rounds) = cli.rounds {
        config.settings.round_limit = rounds;
    }
    if let Some(map) = cli.map.as_ref() {
        config.settings.map_name = map.clone();
    }

    if cli.save_config {
        let path = save_config(&config)?;
        println!("Config saved to {}", path.display());
        return Ok(());
    }

    let map = resolve_map(&cli, &config.settings)?;
    let mut app = create_headless_app(MatchSession::new(map, config.settings), true);

    let exit = run_ticks(&mut app, cli.ticks);
    let scoreboard = app.world().resource::<Scoreboard>();
    info!(
        "Match finished after {} rounds ({}), scores {:?}",
        scoreboard.rounds_played,
        if exit.is_some() {
            "round limit"
        } else {
            "tick limit"
        },
        scoreboard.scores
    );
    match scoreboard.leader() {
        Some(player) => info!("Tank {player} leads"),
        None => info!("No flag was captured"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_map_file() -> GameSettings {
        GameSettings {
            map_file: Some("/nonexistent/tankctf-arena.toml".to_string()),
            ..default()
        }
    }

    #[test]
    fn test_map_flag_overrides_config_map_file() {
        let cli = Cli::parse_from(["tankctf", "--map", "map3"]);
        let map = resolve_map(&cli, &settings_with_map_file()).unwrap();
        assert_eq!(map.name, "map3");
    }

    #[test]
    fn test_config_map_file_used_without_flags() {
        let cli = Cli::parse_from(["tankctf"]);
        assert!(resolve_map(&cli, &settings_with_map_file()).is_err());
        assert_eq!(resolve_map(&cli, &GameSettings::default()).unwrap().name, "map0");
    }

    #[test]
    fn test_random_seed_wins() {
        let cli = Cli::parse_from(["tankctf", "--map", "map3", "--random-seed", "7"]);
        let map = resolve_map(&cli, &settings_with_map_file()).unwrap();
        assert_eq!(map.name, "random-7");
    }
}
