//! gesture_tree: interactive entry point.

use std::io::{self, Write};

use clap::Parser;

use gesture_tree::app::{run, AppConfig, Backend};
use hand_signal::ClassifierConfig;
use tree_mode::SelectionPolicy;

/// Conduct a particle Christmas tree with one hand.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Start immediately with defaults for anything not given.
    #[arg(long)]
    quick: bool,

    /// Photo to hang on the tree (repeatable).
    #[arg(long = "photo", value_name = "PATH")]
    photos: Vec<String>,

    /// Number of decorative particles.
    #[arg(long, default_value_t = 600)]
    particles: usize,

    /// How a pinch picks the photo to view: random | nearest.
    #[arg(long)]
    selection: Option<SelectionPolicy>,

    /// Absolute pinch threshold (normalized image units).
    #[arg(long, default_value_t = 0.05)]
    pinch_abs: f32,

    /// Pinch threshold relative to hand size.
    #[arg(long, default_value_t = 0.5)]
    pinch_rel: f32,

    /// Seed for layout and photo selection.
    #[arg(long)]
    seed: Option<u64>,

    /// Hand tracker: sim | leap.
    #[arg(long)]
    backend: Option<Backend>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Gesture Tree: hand-conducted particle Christmas        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  LeapMotion support: built in (--backend leap)");
    #[cfg(not(feature = "leap"))]
    println!("  LeapMotion support: off (use --features leap for hardware)");
    println!();

    let mut cfg = AppConfig {
        particles:  cli.particles,
        photos:     cli.photos,
        seed:       cli.seed,
        classifier: ClassifierConfig { pinch_abs: cli.pinch_abs, pinch_rel: cli.pinch_rel },
        ..AppConfig::default()
    };

    if cli.quick {
        cfg.selection = cli.selection.unwrap_or_default();
        cfg.backend   = cli.backend.unwrap_or_default();
    } else {
        cfg.selection = cli.selection.unwrap_or_else(pick_selection);
        cfg.backend   = cli.backend.unwrap_or_else(pick_backend);
        if cfg.photos.is_empty() {
            cfg.photos = pick_photos();
        }
    }

    println!();
    println!("  {} photos, {} selection, {} tracker", cfg.photos.len(), cfg.selection, cfg.backend);
    println!("  Opening visualizer window…");
    println!();

    run(cfg)
}

fn pick_selection() -> SelectionPolicy {
    println!("  Pinch selects:  1.a random photo  2.the photo nearest the cursor");
    match read_line("  Choice (1–2, default 1): ").trim() {
        "2" => SelectionPolicy::Nearest,
        _   => SelectionPolicy::Random,
    }
}

fn pick_backend() -> Backend {
    if !cfg!(feature = "leap") {
        return Backend::Simulation;
    }
    println!("  Hand input:  1.keyboard + mouse  2.LeapMotion");
    match read_line("  Choice (1–2, default 1): ").trim() {
        "2" => Backend::Leap,
        _   => Backend::Simulation,
    }
}

fn pick_photos() -> Vec<String> {
    println!("  Photo paths, one per line (empty line to finish):");
    let mut photos = Vec::new();
    loop {
        let line = read_line("    > ");
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        photos.push(line.to_string());
    }
    photos
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    let _ = io::stdin().read_line(&mut s);
    s
}
