use std::num::NonZeroU32;
use std::time::Instant;

use opentelemetry::trace::{Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::Tracer;
use reqwest::{Request, StatusCode};

use crate::card::CardList;
use crate::client::TracedClient;

pub const API_ENDPOINT: &str = "https://api.pokemontcg.io/v2/cards";
pub const ORDER_BY: &str = "id";
/// Fire or grass, no metal, rare but neither holo nor promo.
pub const CARD_FILTER: &str =
    "(types:fire OR types:grass) -types:metal rarity:rare -rarity:holo -rarity:promo";

const API_KEY_HEADER: &str = "X-Api-Key";

/// Parameters of the one catalog request we make.
#[derive(Debug, Clone)]
pub struct CardQuery {
    endpoint: String,
    limit: NonZeroU32,
    api_key: Option<String>,
}

impl CardQuery {
    pub fn new(limit: NonZeroU32) -> Self {
        Self {
            endpoint: API_ENDPOINT.to_string(),
            limit,
            api_key: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn limit(&self) -> NonZeroU32 {
        self.limit
    }

    pub fn build(&self, client: &TracedClient) -> reqwest::Result<Request> {
        let mut builder = client.get(self.endpoint.as_str()).query(&[
            ("pageSize", self.limit.to_string().as_str()),
            ("orderBy", ORDER_BY),
            ("q", CARD_FILTER),
        ]);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.build()
    }
}

/// How a single fetch ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The request could not be built; nothing was sent.
    InvalidRequest(reqwest::Error),
    /// No response was received.
    TransportFailure(reqwest::Error),
    DecodeFailure {
        status: StatusCode,
        error: reqwest::Error,
    },
    /// The body decoded but the status was not 200 OK.
    StatusError { status: StatusCode, cards: CardList },
    Success { status: StatusCode, cards: CardList },
}

impl FetchOutcome {
    /// The response status, if a response was received at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::InvalidRequest(_) | Self::TransportFailure(_) => None,
            Self::DecodeFailure { status, .. }
            | Self::StatusError { status, .. }
            | Self::Success { status, .. } => Some(*status),
        }
    }

    pub fn cards(&self) -> Option<&CardList> {
        match self {
            Self::StatusError { cards, .. } | Self::Success { cards, .. } => Some(cards),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn into_result(self) -> Result<(StatusCode, CardList), FetchError> {
        match self {
            Self::InvalidRequest(e) => Err(FetchError::Build(e)),
            Self::TransportFailure(e) => Err(FetchError::Transport(e)),
            Self::DecodeFailure { status, error } => Err(FetchError::Decode {
                status,
                source: error,
            }),
            Self::StatusError { status, cards } => Err(FetchError::Status { status, cards }),
            Self::Success { status, cards } => Ok((status, cards)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to create HTTP request")]
    Build(#[source] reqwest::Error),
    #[error("failed to perform HTTP request")]
    Transport(#[source] reqwest::Error),
    #[error("failed to decode JSON (HTTP/{})", .status.as_u16())]
    Decode {
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP/{}", .status.as_u16())]
    Status { status: StatusCode, cards: CardList },
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Build(_) | Self::Transport(_) => None,
            Self::Decode { status, .. } | Self::Status { status, .. } => Some(*status),
        }
    }
}

/// Fetch one page of cards under a `drawCardsHTTP` span parented to `cx`.
pub async fn fetch_cards(
    cx: &Context,
    client: &TracedClient,
    query: &CardQuery,
    tracer: &Tracer,
) -> FetchOutcome {
    let request = match query.build(client) {
        Ok(request) => request,
        Err(e) => return FetchOutcome::InvalidRequest(e),
    };

    let span = tracer.start_with_context("drawCardsHTTP", cx);
    let cx = cx.with_span(span);

    let outcome = send_and_decode(&cx, client, request).await;

    let span = cx.span();
    match &outcome {
        FetchOutcome::TransportFailure(e) | FetchOutcome::DecodeFailure { error: e, .. } => {
            span.set_status(Status::error(e.to_string()));
        }
        FetchOutcome::StatusError { status, .. } => {
            span.set_attribute(KeyValue::new("error", "non-OK HTTP status code"));
            span.set_status(Status::error(format!("HTTP/{}", status.as_u16())));
        }
        FetchOutcome::InvalidRequest(_) | FetchOutcome::Success { .. } => {}
    }
    span.end();

    outcome
}

async fn send_and_decode(cx: &Context, client: &TracedClient, request: Request) -> FetchOutcome {
    let response = match client.execute(request, cx).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Request failed: {e}");
            return FetchOutcome::TransportFailure(e);
        }
    };

    let status = response.status();
    let span = cx.span();
    span.set_attribute(KeyValue::new("http.status_code", i64::from(status.as_u16())));

    let started = Instant::now();
    let decoded = response.json::<CardList>().await;
    let elapsed = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    span.set_attribute(KeyValue::new("json.unmarshal_time_ms", elapsed));

    let cards = match decoded {
        Ok(cards) => cards,
        Err(error) => return FetchOutcome::DecodeFailure { status, error },
    };
    tracing::debug!(
        status = status.as_u16(),
        cards = cards.len(),
        total = ?cards.total_count,
        "Decoded card list in {elapsed}ms"
    );

    if status != StatusCode::OK {
        return FetchOutcome::StatusError { status, cards };
    }
    FetchOutcome::Success { status, cards }
}
