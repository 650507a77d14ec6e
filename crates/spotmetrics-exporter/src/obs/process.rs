//! Process-level callback gauges.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use spotmetrics_core::{Opts, Registry, Result};

/// Register `process_start_time_seconds` and `process_uptime_seconds`.
///
/// Both are callback gauges: nothing updates them, the values are computed
/// when a scrape reaches them.
pub fn register_process_metrics(registry: &Registry) -> Result<()> {
    let started = Instant::now();
    let start_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();

    registry.gauge_fn(
        Opts::new("process_start_time_seconds")
            .help("Start time of the process since unix epoch in seconds."),
        move || start_epoch,
    )?;
    registry.gauge_fn(
        Opts::new("process_uptime_seconds").help("Seconds since the exporter started."),
        move || started.elapsed().as_secs_f64(),
    )?;
    tracing::debug!("process metrics registered");
    Ok(())
}
