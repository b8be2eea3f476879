use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Identifier assigned to a label. Trello exports use opaque hex strings; the
/// plain string representation is kept for ease of lookup.
pub type LabelId = String;

/// Identifier assigned to a list.
pub type ListId = String;

/// A label record as it appears in the export's `labels` array. Extra fields
/// such as `color` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
}

/// The board's label collection, in its state before or after resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelSet {
    /// The raw `labels` array as loaded from the export.
    Raw(Vec<Value>),
    /// Label id → display name.
    Resolved(BTreeMap<LabelId, String>),
}

impl LabelSet {
    /// Returns the id → name mapping when labels have been resolved.
    pub fn resolved(&self) -> Option<&BTreeMap<LabelId, String>> {
        match self {
            LabelSet::Resolved(names) => Some(names),
            LabelSet::Raw(_) => None,
        }
    }
}

/// A list from the export's `lists` array. `fields` keeps the complete record
/// in document order for the optional sheet info block.
#[derive(Debug, Clone, PartialEq)]
pub struct ListInfo {
    pub id: ListId,
    pub name: String,
    pub fields: Map<String, Value>,
}

/// A card from the export's `cards` array, with its owning list extracted and
/// the complete field map kept in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub list_id: ListId,
    pub fields: Map<String, Value>,
}

impl Card {
    /// Human-readable tag used in error messages, preferring the card's name
    /// over its id.
    pub fn tag(&self) -> String {
        self.fields
            .get("name")
            .or_else(|| self.fields.get("id"))
            .and_then(Value::as_str)
            .map_or_else(|| "<unnamed>".to_string(), str::to_string)
    }
}

/// An in-memory board export, transformed in place by the pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub labels: LabelSet,
    pub lists: Vec<ListInfo>,
    pub cards: Vec<Card>,
}

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Plain text cell.
    Text(String),
    /// Numeric cell.
    Number(f64),
    /// Boolean cell.
    Boolean(bool),
    /// Written as a blank cell. Produced by JSON `null` and by cards with no
    /// labels.
    Empty,
}
