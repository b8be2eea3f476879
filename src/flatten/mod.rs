use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;
use tracing::info;

use crate::error::{Result, ToolError};
use crate::model::{Board, Card, CellValue, LabelSet, ListId, ListInfo};

/// Separator used when a card carries more than one label.
pub const LABEL_SEPARATOR: &str = ", ";

/// Options steering how the board is laid out as sheets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOptions {
    /// Prepend each sheet with the owning list's key/value block.
    pub include_list_info: bool,
    /// Emit sheets for lists that own no cards.
    pub include_empty_lists: bool,
}

/// A table that will be materialised as one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    /// Optional two-row block describing the list itself.
    pub list_info: Option<InfoBlock>,
    /// Header row; empty when the list owns no cards.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Key/value block rendered above the header when requested.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoBlock {
    pub keys: Vec<String>,
    pub values: Vec<CellValue>,
}

/// Represents all tables required to materialise the workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// A card after label rewriting and nested-value flattening: ordered
/// field name → cell pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatCard {
    pub fields: Vec<(String, CellValue)>,
}

impl FlatCard {
    /// Returns the cell stored under the given field name.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, cell)| cell)
    }
}

/// Cards grouped by their owning list, keys kept in first-seen order.
#[derive(Debug, Default)]
pub struct CardGroups {
    order: Vec<ListId>,
    groups: HashMap<ListId, Vec<FlatCard>>,
}

impl CardGroups {
    fn insert(&mut self, list_id: ListId, card: FlatCard) {
        match self.groups.entry(list_id) {
            Entry::Occupied(mut entry) => entry.get_mut().push(card),
            Entry::Vacant(entry) => {
                self.order.push(entry.key().clone());
                entry.insert(vec![card]);
            }
        }
    }

    /// Returns the cards grouped under the given list id.
    pub fn get(&self, list_id: &str) -> Option<&[FlatCard]> {
        self.groups.get(list_id).map(Vec::as_slice)
    }

    pub fn contains(&self, list_id: &str) -> bool {
        self.groups.contains_key(list_id)
    }

    /// Iterates the groups in the order their list ids were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FlatCard])> {
        self.order
            .iter()
            .filter_map(|id| self.groups.get(id).map(|cards| (id.as_str(), cards.as_slice())))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Rewrites every card's label references and collection fields into cell
/// values and groups the result by owning list, preserving input order.
pub fn group_cards(board: &Board) -> Result<CardGroups> {
    let mut groups = CardGroups::default();
    for card in &board.cards {
        let flat = flatten_card(card, &board.labels)?;
        groups.insert(card.list_id.clone(), flat);
    }
    Ok(groups)
}

/// Lays the board out as one table per list, honouring the layout options.
///
/// Lists without cards are skipped unless `include_empty_lists` is set; a
/// forcibly included empty list yields a table with no header and no rows.
pub fn build_workbook(board: &Board, options: LayoutOptions) -> Result<WorkbookData> {
    let groups = group_cards(board)?;

    let mut tables = Vec::new();
    for list in &board.lists {
        if !groups.contains(&list.id) && !options.include_empty_lists {
            info!(list = %list.name, "ignoring empty list");
            continue;
        }
        let cards = groups.get(&list.id).unwrap_or_default();
        tables.push(build_table(list, cards, options)?);
    }

    Ok(WorkbookData { tables })
}

fn build_table(list: &ListInfo, cards: &[FlatCard], options: LayoutOptions) -> Result<SheetTable> {
    let list_info = if options.include_list_info {
        Some(build_info_block(list)?)
    } else {
        None
    };

    let columns = column_order(cards);
    let rows = cards
        .iter()
        .map(|card| {
            columns
                .iter()
                .map(|column| card.get(column).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();

    Ok(SheetTable {
        sheet_name: list.name.clone(),
        list_info,
        columns,
        rows,
    })
}

/// Field names in first-seen order across the list's cards. The first card's
/// keys lead; fields that only later cards carry are appended.
fn column_order(cards: &[FlatCard]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for card in cards {
        for (key, _) in &card.fields {
            if seen.insert(key.clone()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn build_info_block(list: &ListInfo) -> Result<InfoBlock> {
    let mut keys = Vec::with_capacity(list.fields.len());
    let mut values = Vec::with_capacity(list.fields.len());
    for (key, value) in &list.fields {
        keys.push(key.clone());
        values.push(flatten_value(value)?);
    }
    Ok(InfoBlock { keys, values })
}

fn flatten_card(card: &Card, labels: &LabelSet) -> Result<FlatCard> {
    if labels.resolved().is_some() && !card.fields.contains_key("labels") {
        return Err(ToolError::MissingField {
            entity: format!("card '{}'", card.tag()),
            field: "labels",
        });
    }

    let mut fields = Vec::with_capacity(card.fields.len());
    for (key, value) in &card.fields {
        let cell = match (key.as_str(), labels.resolved()) {
            ("labels", Some(names)) => resolve_card_labels(card, value, names)?,
            _ => flatten_value(value)?,
        };
        fields.push((key.clone(), cell));
    }
    Ok(FlatCard { fields })
}

/// Collapses a card's label references: no labels becomes a blank cell, a
/// single label its bare name, several labels a joined name list.
fn resolve_card_labels(
    card: &Card,
    value: &Value,
    names: &BTreeMap<String, String>,
) -> Result<CellValue> {
    let Value::Array(entries) = value else {
        return Err(ToolError::InvalidBoard(format!(
            "'labels' on card '{}' is not an array",
            card.tag()
        )));
    };

    let mut resolved = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = entry.get("id").and_then(Value::as_str).ok_or_else(|| {
            ToolError::InvalidBoard(format!(
                "label reference without an 'id' on card '{}'",
                card.tag()
            ))
        })?;
        let name = names.get(id).ok_or_else(|| ToolError::UnknownLabel {
            card: card.tag(),
            label: id.to_string(),
        })?;
        resolved.push(name.as_str());
    }

    Ok(match resolved.as_slice() {
        [] => CellValue::Empty,
        [single] => CellValue::Text((*single).to_string()),
        many => CellValue::Text(many.join(LABEL_SEPARATOR)),
    })
}

/// Turns a JSON value into a cell, rendering embedded arrays and objects as
/// compact JSON strings.
fn flatten_value(value: &Value) -> Result<CellValue> {
    Ok(match value {
        Value::Null => CellValue::Empty,
        Value::Bool(flag) => CellValue::Boolean(*flag),
        Value::Number(number) => CellValue::Number(number.as_f64().ok_or_else(|| {
            ToolError::InvalidBoard(format!("invalid number literal: {number}"))
        })?),
        Value::String(text) => CellValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => CellValue::Text(serde_json::to_string(value)?),
    })
}
