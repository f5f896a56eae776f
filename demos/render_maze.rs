//! Prints a generated maze to standard out.
//!
//! ```text
//! cargo run --example render_maze -- --width 61 --height 21 --seed 7
//! cargo run --example render_maze -- -w 41 -H 41 --ascii --stats
//! ```

#![allow(clippy::print_stdout)]

use clap::Parser;
use labyrinth::{GeneratorConfig, Lcg32, MazeBuilder};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Preset {
    Default,
    Compact,
    Thorough,
}

/// Deterministic perfect-maze generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Opt {
    /// Requested width in pixels (clamped to at least 5, even values lose one)
    #[arg(short, long, default_value_t = 41)]
    width: u32,

    /// Requested height in pixels
    #[arg(short = 'H', long, default_value_t = 21)]
    height: u32,

    /// Seed of the random stream
    #[arg(short, long, default_value_t = 0)]
    seed: u32,

    /// Generator tunables
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Use the legacy LCG stream instead of MT19937
    #[arg(long)]
    legacy: bool,

    /// Render with '#' and ' ' instead of block characters
    #[arg(long)]
    ascii: bool,

    /// Print generation statistics as JSON after the maze
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // configure logging: generation events go to standard error
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    let opt = Opt::parse();

    let config = match opt.preset {
        Preset::Default => GeneratorConfig::default(),
        Preset::Compact => GeneratorConfig::compact(),
        Preset::Thorough => GeneratorConfig::thorough(),
    };
    let builder = MazeBuilder::new(opt.width, opt.height)
        .with_seed(opt.seed)
        .with_config(config);
    let maze = if opt.legacy {
        builder.build_with_rng(&mut Lcg32::new(opt.seed))?
    } else {
        builder.build()?
    };

    if opt.ascii {
        print!("{}", maze.render("#", " "));
    } else {
        print!("{maze}");
    }
    println!("fingerprint: {:016x}", maze.fingerprint());
    if opt.stats {
        println!("{}", serde_json::to_string_pretty(maze.stats())?);
    }
    Ok(())
}
