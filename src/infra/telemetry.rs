use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::metrics as cache_metrics;
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Output goes to stderr so command output on stdout stays machine-readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            cache_metrics::HIT_TOTAL,
            Unit::Count,
            "Queries served from a ready cache entry."
        );
        describe_counter!(
            cache_metrics::MISS_TOTAL,
            Unit::Count,
            "Queries that started a fetch."
        );
        describe_counter!(
            cache_metrics::DEDUP_TOTAL,
            Unit::Count,
            "Queries that joined a fetch already in flight."
        );
        describe_counter!(
            cache_metrics::INVALIDATED_TOTAL,
            Unit::Count,
            "Cache entries marked stale by a mutation."
        );
        describe_counter!(
            cache_metrics::FETCH_ERROR_TOTAL,
            Unit::Count,
            "Fetches that settled with an error."
        );
        describe_counter!(
            cache_metrics::MUTATION_TOTAL,
            Unit::Count,
            "Mutations issued, labelled by kind and outcome."
        );
    });
}
