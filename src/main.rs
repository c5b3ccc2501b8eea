//! Susi Mario - headless runner
//!
//! Plays one stage with the demo autopilot and prints the graded outcome.

use std::path::PathBuf;

use clap::Parser;
use susi_mario::consts::SIM_DT;
use susi_mario::map::list_stages;
use susi_mario::sim::Autopilot;
use susi_mario::{Difficulty, Game, GamePaths, Grade, Settings};

/// Simulated time after which the demo gives up on a run
const MAX_RUN_SECS: f32 = 600.0;

const DEFAULT_SEED: u64 = 0x5EED;

/// Play a stage with the autopilot and grade the run
#[derive(Parser)]
#[command(name = "susi-mario")]
#[command(about = "Headless Susi Mario runner", long_about = None)]
#[command(version)]
struct Cli {
    /// Stage map to play (defaults to the first stage in data/maps)
    stage: Option<PathBuf>,

    /// Autopilot seed
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Difficulty for this run (easy, normal, hard); defaults to the saved setting
    #[arg(short, long)]
    difficulty: Option<Difficulty>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Susi Mario (headless) starting...");

    let paths = GamePaths::default();
    let settings = Settings::load(&paths.config);
    let mut run_settings = settings.clone();
    if let Some(difficulty) = cli.difficulty {
        run_settings.difficulty = difficulty;
    }

    let stage = match cli.stage {
        Some(path) => path,
        None => list_stages(&paths.maps_dir)
            .into_iter()
            .next()
            .map(|s| s.path)
            .unwrap_or_else(|| paths.stage("level1")),
    };
    log::info!(
        "Stage {} on {} with autopilot seed {:#x}",
        stage.display(),
        run_settings.difficulty,
        cli.seed
    );

    let mut game = Game::from_paths(&paths, &stage, &run_settings);
    let mut pilot = Autopilot::new(cli.seed);

    let max_frames = (MAX_RUN_SECS / SIM_DT) as u32;
    for _ in 0..max_frames {
        let input = pilot.next_input(game.state());
        game.set_input(input);
        game.update(SIM_DT);
        if game.outcome().is_some() || game.exit_requested() {
            break;
        }
    }

    match game.outcome() {
        Some(outcome) => {
            let verdict = if outcome.result.victory { "VICTORY" } else { "GAME OVER" };
            println!("{verdict}");
            println!("  time:  {:.2}s", outcome.result.elapsed);
            println!("  lives: {}", outcome.result.lives);
            match outcome.grade {
                Grade::Percentile(p) => println!("  grade: {p:.1}"),
                Grade::Unavailable => println!("  grade: n/a (no earlier runs)"),
            }
            if let Some(tier) = outcome.tier {
                println!("  tier:  {}", tier.label());
            }
            if let Some(best) = game.history().best_time() {
                println!("  best:  {best:.2}s");
            }
            println!("{}", outcome.message);
        }
        None => {
            let hud = game.state().hud();
            println!(
                "Run abandoned after {:.1}s in {:?} with {} lives",
                hud.elapsed, hud.phase, hud.lives
            );
        }
    }

    if let Err(e) = settings.save(&paths.config) {
        log::warn!("Could not save settings: {e}");
    }
}
