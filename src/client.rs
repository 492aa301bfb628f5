use std::time::Duration;

use opentelemetry::propagation::{Injector, TextMapPropagator};
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::Tracer;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, IntoUrl, Request, RequestBuilder, Response};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A reqwest client that opens a client span around every request it sends.
#[derive(Debug, Clone)]
pub struct TracedClient {
    inner: Client,
    tracer: Tracer,
}

impl TracedClient {
    pub fn new(tracer: Tracer) -> reqwest::Result<Self> {
        let inner = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { inner, tracer })
    }

    /// Starts a request for [`TracedClient::execute`]; sending it any other way skips the span.
    pub(crate) fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.inner.get(url)
    }

    /// Send `request` under a new `HTTP <METHOD>` span parented to `cx`.
    ///
    /// The span ends once the response head has arrived, or the call failed.
    pub async fn execute(&self, mut request: Request, cx: &Context) -> reqwest::Result<Response> {
        let method = request.method().to_string();
        let span = self
            .tracer
            .span_builder(format!("HTTP {method}"))
            .with_kind(SpanKind::Client)
            .with_attributes([
                KeyValue::new("http.request.method", method),
                KeyValue::new("url.full", request.url().to_string()),
            ])
            .start_with_context(&self.tracer, cx);
        let cx = cx.with_span(span);

        TraceContextPropagator::new()
            .inject_context(&cx, &mut HeaderInjector(request.headers_mut()));

        tracing::debug!(url = %request.url(), "Sending request");
        let result = self.inner.execute(request).await;

        let span = cx.span();
        match &result {
            Ok(response) => {
                let status = response.status();
                span.set_attribute(KeyValue::new(
                    "http.response.status_code",
                    i64::from(status.as_u16()),
                ));
                if status.is_client_error() || status.is_server_error() {
                    span.set_status(Status::error(status.to_string()));
                }
            }
            Err(e) => {
                span.record_error(e);
                span.set_status(Status::error(e.to_string()));
            }
        }
        span.end();

        result
    }
}

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}
