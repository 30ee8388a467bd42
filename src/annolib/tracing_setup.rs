use backtrace::Backtrace;
use std::io;
use tracing::{error, Level};
use tracing_subscriber::{
    fmt::{writer::MakeWriterExt, Layer},
    prelude::*,
};

/// Logs go to stderr, stdout is reserved for the confirmation lines.
///
/// # Panics
/// In case a global subscriber has already been set.
pub fn tracing_setup() {
    let stderr = Layer::new()
        .with_writer(io::stderr.with_max_level(Level::INFO))
        .compact()
        .with_file(true)
        .with_line_number(true);
    tracing_subscriber::registry().with(stderr).init();
    std::panic::set_hook(Box::new(|info| {
        let trace = Backtrace::new();
        error!("{info}\n{trace:?}");
    }));
}

use std::sync::Once;
static INIT: Once = Once::new();

pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .init();
    });
}
