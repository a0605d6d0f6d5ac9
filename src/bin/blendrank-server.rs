//! blendrank HTTP server binary

use anyhow::Context;
use blendrank::server::{run_server, AppState};
use blendrank::{ComponentScores, Rating, RatingDataset, ScoreEntry, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    println!("blendrank hybrid scorer");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = ServiceConfig::from_env().context("Invalid configuration")?;

    // Check for --demo flag
    let demo = std::env::args().any(|arg| arg == "--demo");

    let dataset = if demo {
        println!("Mode: DEMO dataset (built in)");
        println!("   (omit --demo to load BLENDRANK_DATASET)");
        demo_dataset()
    } else {
        println!("Mode: dataset {}", config.dataset_path);
        RatingDataset::load(&config.dataset_path)?
    };

    println!(
        "Linear blend weight {}, logistic training: {} epochs at lr={} (seed {})",
        config.blend_weight, config.trainer.epochs, config.trainer.learning_rate, config.trainer.seed
    );

    let state = AppState::from_dataset(&config, dataset)?;

    println!("Scorers initialized");
    println!("Starting HTTP server on port {}...", config.port);
    println!();

    run_server(state, config.port).await?;

    Ok(())
}

/// Small synthetic dataset: two component recommenders, one of which tracks the labels
fn demo_dataset() -> RatingDataset {
    let users = 0..20i64;
    let items = 0..30i64;

    let mut ratings = Vec::new();
    let mut training = Vec::new();
    let mut informed = Vec::new();
    let mut noisy = Vec::new();

    for user in users {
        for item in items.clone() {
            let seen = (user * 7 + item * 3) % 5 < 2;
            if seen {
                ratings.push(Rating::new(user, item, 1.0 + ((user + item) % 5) as f64));
            }

            let label = if seen { 1.0 } else { -1.0 };
            if seen || (user + item) % 4 == 0 {
                training.push(Rating::new(user, item, label));
            }

            informed.push(ScoreEntry {
                user,
                item,
                score: 3.0 + label,
            });
            if item % 3 != 0 {
                noisy.push(ScoreEntry {
                    user,
                    item,
                    score: 2.0 + ((user * item) % 4) as f64 * 0.5,
                });
            }
        }
    }

    RatingDataset {
        ratings,
        training,
        components: vec![
            ComponentScores {
                name: "informed".to_string(),
                scores: informed,
            },
            ComponentScores {
                name: "noisy".to_string(),
                scores: noisy,
            },
        ],
    }
}
