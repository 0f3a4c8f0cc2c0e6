// SPDX-License-Identifier: MIT OR Apache-2.0

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    Layer as _, Registry,
    fmt::{Layer as FmtLayer, format::FmtSpan},
    layer::SubscriberExt as _,
};

/// Logging options taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Trace every resolution step
    pub verbose: bool,
    /// ANSI colours on stderr
    pub color: bool,
}

/// Level used for the given options.
#[must_use]
pub const fn level(options: Options) -> LevelFilter {
    if options.verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    }
}

/// Install the global subscriber: a fmt layer on stderr filtered by level.
///
/// # Errors
///
/// Fails if a global subscriber was already installed.
pub fn set_up(options: Options) -> Result<()> {
    let span_events = if options.verbose {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = FmtLayer::new()
        .with_writer(std::io::stderr)
        .with_span_events(span_events)
        .with_ansi(options.color)
        .with_filter(level(options));
    let subscriber = Registry::default().with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to set up tracing: {e}"))
}
