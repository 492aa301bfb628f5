use serde::{Deserialize, Deserializer, Serialize};

/// A single catalog entry.
///
/// The upstream API uses lowercase keys; the report we print uses the
/// capitalized ones. Both spellings are accepted when decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    #[serde(rename(serialize = "ID"), alias = "ID")]
    pub id: String,
    #[serde(rename(serialize = "Name"), alias = "Name")]
    pub name: String,
    #[serde(
        rename(serialize = "Types"),
        alias = "Types",
        deserialize_with = "null_as_empty"
    )]
    pub types: Vec<String>,
    /// Hit points, a string upstream (e.g. `"120"`).
    #[serde(rename(serialize = "HP"), alias = "HP")]
    pub hp: String,
    #[serde(rename(serialize = "Rarity"), alias = "Rarity")]
    pub rarity: String,
}

/// The `/v2/cards` response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardList {
    #[serde(rename = "data", default, deserialize_with = "null_as_empty")]
    pub cards: Vec<Card>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub count: Option<u32>,
    pub total_count: Option<u32>,
}

impl CardList {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Upstream sends `null` for some empty lists.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// What gets printed to stdout: `{"Cards": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardReport {
    #[serde(rename = "Cards")]
    pub cards: Vec<Card>,
}

impl From<CardList> for CardReport {
    fn from(list: CardList) -> Self {
        Self { cards: list.cards }
    }
}
