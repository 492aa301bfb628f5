use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use reqwest::StatusCode;

use crate::card::{CardList, CardReport};

pub fn summary(status: StatusCode, count: usize) -> String {
    format!("HTTP/{} A wild {count} cards appeared!", status.as_u16())
}

/// Serialize the cards for stdout and log the summary line.
pub fn render(status: StatusCode, cards: CardList) -> Result<String> {
    let count = cards.len();
    let json = serde_json::to_string(&CardReport::from(cards)).wrap_err("Failed to marshal JSON")?;
    tracing::info!("{}", summary(status, count));
    Ok(json)
}
