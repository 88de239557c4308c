use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::resolver::{
    METRIC_GENERATE_FAILED, METRIC_GENERATE_MS, METRIC_VARIANT_HIT, METRIC_VARIANT_MISS,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
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
            METRIC_VARIANT_HIT,
            Unit::Count,
            "Total number of variant requests served from the content store."
        );
        describe_counter!(
            METRIC_VARIANT_MISS,
            Unit::Count,
            "Total number of variant requests that required generation."
        );
        describe_counter!(
            METRIC_GENERATE_FAILED,
            Unit::Count,
            "Total number of failed or timed-out generation attempts."
        );
        describe_histogram!(
            METRIC_GENERATE_MS,
            Unit::Milliseconds,
            "Generator round-trip latency in milliseconds."
        );
    });
}
