#![allow(dead_code)]

mod application;
mod cli;
mod data;
mod domain;
mod error;
mod infra;
mod model;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lda_gibbs=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
