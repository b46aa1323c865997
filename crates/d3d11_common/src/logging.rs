use tracing::level_filters::LevelFilter;

use crate::error::MyResult;

/// Installs the colored panic/error report hooks and the console subscriber.
/// Call once, first thing in `main`.
pub fn init_tracing(verbose: bool) -> MyResult<()> {
    color_eyre::install()?;

    let max_level = if verbose || cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_target(false)
        .with_max_level(max_level)
        .init();
    Ok(())
}
