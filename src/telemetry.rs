//! OpenTelemetry setup.
//!
//! The provider is owned by a [`Telemetry`] value that callers pass around
//! explicitly; nothing is registered with the `opentelemetry::global` helpers.

use std::time::Duration;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::runtime;
use opentelemetry_sdk::trace::{Sampler, Tracer, TracerProvider};

pub const TRACER_NAME: &str = "pokecards";
pub const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317/v1/traces";
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_millis(5);

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// OTLP/HTTP collector URL. Plain `http://` means no TLS.
    pub endpoint: String,
    pub export_timeout: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            export_timeout: DEFAULT_EXPORT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub struct Telemetry {
    provider: TracerProvider,
}

impl Telemetry {
    /// Batch-export every span to the configured collector.
    ///
    /// Must be called from within a tokio runtime, the batch processor is
    /// spawned onto it.
    pub fn init(config: &TelemetryConfig) -> Result<Self> {
        let exporter = SpanExporter::builder()
            .with_http()
            .with_endpoint(config.endpoint.clone())
            .with_timeout(config.export_timeout)
            .build()
            .wrap_err("Failed to create OTLP exporter")?;

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_sampler(Sampler::AlwaysOn)
            .build();

        tracing::debug!(endpoint = %config.endpoint, "Tracer provider initialized");
        Ok(Self::from_provider(provider))
    }

    pub fn from_provider(provider: TracerProvider) -> Self {
        Self { provider }
    }

    pub fn tracer(&self) -> Tracer {
        self.provider.tracer(TRACER_NAME)
    }

    /// Flush buffered spans and release the exporter. Failures are only logged.
    pub fn shutdown(self) {
        if let Err(e) = self.provider.shutdown() {
            tracing::error!("Failed to shut down tracer provider: {e}");
        }
    }
}
