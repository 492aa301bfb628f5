use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Report, WrapErr};
use color_eyre::Result;
use opentelemetry::trace::{TraceContextExt, Tracer as _};
use opentelemetry::Context;
use opentelemetry_sdk::trace::Tracer;

pub mod card;
pub mod client;
pub mod fetch;
pub mod logging;
pub mod report;
pub mod telemetry;

pub use card::{Card, CardList, CardReport};
pub use client::TracedClient;
pub use fetch::{fetch_cards, CardQuery, FetchError, FetchOutcome};
pub use telemetry::{Telemetry, TelemetryConfig};

/// Draw a page of fire and grass cards from the Pokémon TCG API.
#[derive(Debug, Parser)]
#[clap(name = "pokecards", version)]
pub struct PokeCli {
    /// The number of cards to retrieve
    #[clap(long, default_value = "10")]
    pub limit: NonZeroU32,

    /// The file to write logs to
    #[clap(long, default_value = logging::DEFAULT_LOG_FILE)]
    pub log: PathBuf,

    /// Card search endpoint
    #[clap(long, default_value = fetch::API_ENDPOINT)]
    pub endpoint: String,

    /// OTLP/HTTP trace collector
    #[clap(long, default_value = telemetry::DEFAULT_OTLP_ENDPOINT)]
    pub otlp_endpoint: String,

    /// Pokémon TCG API key, raises the upstream rate limit
    #[clap(long, env = "POKEMONTCG_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl PokeCli {
    pub fn query(&self) -> CardQuery {
        let query = CardQuery::new(self.limit).with_endpoint(self.endpoint.as_str());
        match &self.api_key {
            Some(key) => query.with_api_key(key.as_str()),
            None => query,
        }
    }

    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            endpoint: self.otlp_endpoint.clone(),
            ..TelemetryConfig::default()
        }
    }

    /// Run once: fetch, print the cards, flush traces.
    pub async fn execute(self) -> Result<()> {
        let telemetry = Telemetry::init(&self.telemetry_config()).map_err(fatal)?;

        let result = self.draw_cards(&telemetry).await.map_err(fatal);
        if let Ok(json) = &result {
            println!("{json}");
        }

        telemetry.shutdown();
        result.map(drop)
    }

    /// Fetch one page under a root `drawCards` span and render it as JSON.
    pub async fn draw_cards(&self, telemetry: &Telemetry) -> Result<String> {
        let tracer = telemetry.tracer();
        let span = tracer.start_with_context("drawCards", &Context::new());
        let cx = Context::new().with_span(span);

        let result = self.draw(&cx, &tracer).await;

        cx.span().end();
        result
    }

    async fn draw(&self, cx: &Context, tracer: &Tracer) -> Result<String> {
        let client = TracedClient::new(tracer.clone()).wrap_err("Failed to create HTTP client")?;
        let (status, cards) = fetch_cards(cx, &client, &self.query(), tracer)
            .await
            .into_result()
            .wrap_err("Failed to make cards appear")?;
        report::render(status, cards)
    }
}

fn fatal(report: Report) -> Report {
    let chain: Vec<_> = report.chain().map(ToString::to_string).collect();
    tracing::error!("{}", chain.join(": "));
    report
}
