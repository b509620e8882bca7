// ============================================================
// CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction; parses arguments with
// clap and delegates the work to the application layer.
//
// Two commands are supported:
//   1. `train` — estimate phi/theta on a corpus
//   2. `infer` — apply a trained phi to new documents

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InferArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "lda-gibbs",
    version = "0.1.0",
    about = "Train LDA topic models with collapsed Gibbs sampling, then infer topics for new documents."
)]
pub struct Cli {
    /// The subcommand to run (train or infer)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// The CLI layer only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Infer(args) => run_infer(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training on corpus: {}", args.corpus);
    TrainUseCase::new(args.into()).execute()
}

fn run_infer(args: InferArgs) -> Result<()> {
    use crate::application::infer_use_case::InferUseCase;

    tracing::info!("Inference on corpus: {}", args.corpus);
    InferUseCase::new(args.into()).execute()
}
