use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use twenty48_core::{Direction, Game};

#[derive(Debug, Parser)]
#[command(name = "twenty48", about = "Random self-play driver for the 2048 rule engine")]
struct Args {
    /// Board side length
    #[arg(long, default_value_t = 4)]
    size: usize,

    /// RNG seed for a reproducible game; omit for a fresh one each run
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress per-move board printing
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut game = Game::new(args.size);
    game.spawn_random_tile(&mut rng);
    game.spawn_random_tile(&mut rng);
    if !args.quiet {
        println!("{game}");
    }

    let mut move_count = 0u64;
    while !game.game_over() {
        // Try the four directions in random order, take the first that moves.
        let mut dirs = Direction::ALL;
        dirs.shuffle(&mut rng);
        let mut moved = None;
        for dir in dirs {
            if game.tilt(dir) {
                moved = Some(dir);
                break;
            }
        }
        let Some(dir) = moved else {
            break;
        };
        move_count += 1;
        log::debug!("move {move_count}: tilted {dir}, score {}", game.score());
        game.spawn_random_tile(&mut rng);
        if !args.quiet {
            println!("{game}");
        }
    }

    log::info!("run finished after {move_count} moves");
    println!(
        "Moves made: {}, final score: {}, best score: {}",
        move_count,
        game.score(),
        game.max_score()
    );
    Ok(())
}
