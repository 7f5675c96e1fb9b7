mod anim;
mod app;
mod config;
mod input;
mod logging;
mod model;
mod render;
mod sched;
mod sim;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    app::run(config::Cli::parse())
}
