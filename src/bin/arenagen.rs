use clap::Parser;
use tankctf::map::generate_random_arena;
use tankctf::{ArenaGeneratorConfig, CellType, CtfError, CtfResult, MapDefinition};

#[derive(Parser, Clone)]
#[command(name = "arenagen")]
#[command(about = "Generate random capture-the-flag arenas as TOML map files")]
struct Args {
    /// Arena size in tiles (format: WIDTHxHEIGHT)
    #[arg(long, default_value = "11x11")]
    size: String,

    /// Share of cells that receive a box (0.0-0.8)
    #[arg(long, default_value = "0.3")]
    density: f32,

    /// Random seed for reproducible generation
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Output TOML file
    #[arg(long)]
    output: Option<String>,
}

/// Parse size string "WIDTHxHEIGHT"
fn parse_size(size: &str) -> CtfResult<(u32, u32)> {
    let invalid = || CtfError::InvalidArgument {
        reason: format!("Invalid size '{size}'. Expected WIDTHxHEIGHT"),
    };
    let (width, height) = size.split_once('x').ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;

    if width > 256 || height > 256 {
        return Err(CtfError::InvalidArgument {
            reason: "Width and height must not exceed 256".to_string(),
        });
    }
    Ok((width, height))
}

fn main() -> CtfResult<()> {
    let args = Args::parse();
    let (width, height) = parse_size(&args.size)?;

    let map = generate_random_arena(ArenaGeneratorConfig {
        width,
        height,
        density: args.density,
        seed: args.seed,
    })?;
    let output = args.output.unwrap_or_else(|| format!("{}.toml", map.name));
    map.save_to_file(&output)?;

    print_map_summary(&map, &output);
    Ok(())
}

fn print_map_summary(map: &MapDefinition, output: &str) {
    println!("Map saved to: {output}");
    println!("  Name: {}", map.name);
    println!("  Size: {}x{}", map.width, map.height);
    println!("  Flag: {:?}", map.flag_position);
    for (player, spawn) in map.start_positions.iter().enumerate() {
        println!("  Start {player}: ({}, {}) facing {}°", spawn.x, spawn.y, spawn.orientation);
    }

    let count = |kind: CellType| map.obstacles().filter(|(_, cell)| *cell == kind).count();
    println!(
        "  Boxes: {} rock, {} wood, {} metal",
        count(CellType::Wall),
        count(CellType::Destructible),
        count(CellType::Pushable)
    );
    for row in map.cells.iter().rev() {
        let line: String = row
            .iter()
            .map(|cell| match cell {
                CellType::Open => '.',
                CellType::Wall => '#',
                CellType::Destructible => 'w',
                CellType::Pushable => 'm',
            })
            .collect();
        println!("  {line}");
    }
}
