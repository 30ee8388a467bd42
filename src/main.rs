#![deny(clippy::all)]
#![forbid(unsafe_code)]

use std::path::PathBuf;

use annolib::{annotate, result::AnResult, tracing_setup::tracing_setup, View, VIEWS};
use clap::Parser;
use tracing::info;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", dirty: ",
    env!("GIT_DIRTY"),
    ")"
);

/// Draws 3 seeded labeled boxes onto each of the upper, front and lower view images.
#[derive(Parser, Debug)]
#[command(version, long_version = LONG_VERSION, about)]
struct Args {
    #[arg(long = "in_upper")]
    in_upper: PathBuf,
    #[arg(long = "in_front")]
    in_front: PathBuf,
    #[arg(long = "in_lower")]
    in_lower: PathBuf,
    #[arg(long = "out_upper")]
    out_upper: PathBuf,
    #[arg(long = "out_front")]
    out_front: PathBuf,
    #[arg(long = "out_lower")]
    out_lower: PathBuf,
}
impl Args {
    fn paths(&self, view: View) -> (&PathBuf, &PathBuf) {
        match view {
            View::Upper => (&self.in_upper, &self.out_upper),
            View::Front => (&self.in_front, &self.out_front),
            View::Lower => (&self.in_lower, &self.out_lower),
        }
    }
}

fn main() -> AnResult<()> {
    let args = Args::parse();
    tracing_setup();
    for view in VIEWS {
        let (input, output) = args.paths(view);
        info!("annotating {} view", view.name());
        annotate(input, output, view.seed())?;
    }
    Ok(())
}
