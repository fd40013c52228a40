use clap::Parser;
use disc_optimizer::catalog::{Catalog, RectangleType};
use disc_optimizer::evolution::Evolution;
use disc_optimizer::render;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "disc_optimizer",
    about = "Evolutionary optimizer packing valued rectangles into circular stock"
)]
struct Cli {
    /// Radius of the circular stock
    #[arg(long)]
    radius: f64,

    /// Catalog shapes as WxH:value (e.g. 2x1:4 3x2:5)
    #[arg(long = "shapes", num_args = 1..)]
    shapes: Vec<String>,

    /// Population size
    #[arg(long, default_value_t = 20)]
    population: usize,

    /// Number of generations to run
    #[arg(long, default_value_t = 50)]
    generations: usize,

    /// Crossover children per generation
    #[arg(long, default_value_t = 10)]
    crossings: usize,

    /// Mutants per generation
    #[arg(long, default_value_t = 10)]
    mutations: usize,

    /// Individuals carried over unconditionally each generation
    #[arg(long, default_value_t = 2)]
    elite: usize,

    /// Random placement attempts when seeding each individual
    #[arg(long, default_value_t = 500)]
    seed_rects: usize,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Show ASCII layout of the best packing
    #[arg(long)]
    layout: bool,
}

fn parse_shape(s: &str) -> Result<RectangleType, String> {
    let (dims, value) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid shape '{}', expected WxH:value", s))?;
    let (w, h) = dims
        .split_once('x')
        .ok_or_else(|| format!("invalid dimensions in '{}', expected WxH", s))?;
    let width = w
        .parse::<f64>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let height = h
        .parse::<f64>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    let value = value
        .parse::<f64>()
        .map_err(|_| format!("invalid value in '{}'", s))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("dimensions must be positive in '{}'", s));
    }
    if value < 0.0 {
        return Err(format!("value must be non-negative in '{}'", s));
    }
    Ok(RectangleType::new(width, height, value))
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    if cli.radius <= 0.0 {
        eprintln!("Error: radius must be positive");
        std::process::exit(1);
    }

    let shapes: Vec<RectangleType> = cli
        .shapes
        .iter()
        .map(|s| parse_shape(s))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut evolution = Evolution::new(
        cli.population,
        cli.radius,
        Catalog::new(shapes),
        cli.seed_rects,
        &mut rng,
    )
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    for generation in 1..=cli.generations {
        if let Err(e) = evolution.iter(cli.mutations, cli.crossings, cli.elite, &mut rng) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        if let Some(best) = evolution.best() {
            tracing::info!(generation, best = best.evaluate(), "generation complete");
        }
    }

    let Some(best) = evolution.best() else {
        eprintln!("Error: empty population");
        std::process::exit(1);
    };

    println!("Best packing ({} rectangles):", best.rects().len());
    for rect in best.rects() {
        println!("  {} (value {})", rect, rect.value);
    }
    if cli.layout {
        print!("{}", render::render_packing(best));
    }
    println!("Total value: {}", best.evaluate());
}
