//! Log output and optional span export.
//!
//! Logs always go to stderr through a pretty `fmt` layer. Spans are also
//! shipped over OTLP/gRPC when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

use anyhow::{anyhow, Context, Result};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use once_cell::sync::OnceCell;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::{Compression, SpanExporter, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace::SdkTracerProvider, Resource};
use std::{env, time::Duration};
use tonic::{metadata::MetadataMap, transport::ClientTlsConfig};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use ulid::Ulid;

const ENV_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
const ENV_HEADERS: &str = "OTEL_EXPORTER_OTLP_HEADERS";
const ENV_INSTANCE_ID: &str = "OTEL_SERVICE_INSTANCE_ID";

const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);

static PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// Where and how to ship spans.
#[derive(Debug)]
struct Exporter {
    endpoint: String,
    headers: HeaderMap,
    instance_id: String,
}

impl Exporter {
    /// `None` when no endpoint is configured.
    fn from_env() -> Result<Option<Self>> {
        Self::from_values(
            env::var(ENV_ENDPOINT).ok(),
            env::var(ENV_HEADERS).ok(),
            env::var(ENV_INSTANCE_ID).ok(),
        )
    }

    fn from_values(
        endpoint: Option<String>,
        headers: Option<String>,
        instance_id: Option<String>,
    ) -> Result<Option<Self>> {
        let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };

        let endpoint = endpoint.trim().trim_end_matches('/');
        let endpoint = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };

        Ok(Some(Self {
            endpoint,
            headers: headers.as_deref().map(header_map).transpose()?.unwrap_or_default(),
            instance_id: instance_id.unwrap_or_else(|| Ulid::new().to_string()),
        }))
    }

    /// Host to verify the collector certificate against, for `https` endpoints.
    fn tls_domain(&self) -> Option<&str> {
        let authority = self.endpoint.strip_prefix("https://")?.split('/').next()?;
        authority.split(':').next().filter(|host| !host.is_empty())
    }

    fn span_exporter(&self) -> Result<SpanExporter> {
        let mut builder = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&self.endpoint)
            .with_compression(Compression::Gzip)
            .with_timeout(EXPORT_TIMEOUT);

        if let Some(domain) = self.tls_domain() {
            builder = builder.with_tls_config(
                ClientTlsConfig::new()
                    .domain_name(domain)
                    .with_native_roots(),
            );
        }

        if !self.headers.is_empty() {
            builder = builder.with_metadata(MetadataMap::from_headers(self.headers.clone()));
        }

        Ok(builder.build()?)
    }

    fn provider(&self) -> Result<SdkTracerProvider> {
        let resource = Resource::builder()
            .with_service_name(env!("CARGO_PKG_NAME"))
            .with_attributes([
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                KeyValue::new("service.instance.id", self.instance_id.clone()),
            ])
            .build();

        Ok(SdkTracerProvider::builder()
            .with_batch_exporter(self.span_exporter()?)
            .with_resource(resource)
            .build())
    }
}

/// Parse `key=value,key=value` into request headers. Values may contain `=`.
fn header_map(raw: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for pair in raw.split(',').filter(|pair| !pair.trim().is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("{ENV_HEADERS}: expected key=value, got `{}`", pair.trim()))?;

        let name = HeaderName::from_bytes(name.trim().to_ascii_lowercase().as_bytes())
            .with_context(|| format!("{ENV_HEADERS}: invalid header name `{}`", name.trim()))?;
        let value = HeaderValue::from_str(value.trim())
            .with_context(|| format!("{ENV_HEADERS}: invalid value for `{name}`"))?;

        headers.insert(name, value);
    }

    Ok(headers)
}

/// Install the global subscriber.
///
/// `verbosity_level` is the default filter; `RUST_LOG` still wins.
///
/// # Errors
/// Returns an error if the OTLP settings are invalid or a subscriber is
/// already installed.
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.unwrap_or(Level::ERROR).into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?);

    let fmt_layer = fmt::layer().with_target(false).pretty();

    let otel_layer = match Exporter::from_env()? {
        Some(exporter) => {
            let provider = exporter.provider()?;
            let tracer = provider.tracer(env!("CARGO_PKG_NAME"));

            global::set_text_map_propagator(TraceContextPropagator::new());
            global::set_tracer_provider(provider.clone());
            let _ = PROVIDER.set(provider);

            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(fmt_layer)
        .with(otel_layer)
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Flush pending spans. Does nothing when export is disabled.
pub fn shutdown_tracer() {
    if let Some(provider) = PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            debug!("Failed to flush spans: {e}");
        }
    }
}
