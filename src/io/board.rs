use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, ToolError};
use crate::model::{Board, Card, LabelSet, ListInfo};

/// Loads a board export from the given path and validates its overall shape.
pub fn load_board(path: &Path) -> Result<Board> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let source = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&source)?;
    parse_board(document)
}

/// Builds the in-memory board from a parsed export document.
pub fn parse_board(document: Value) -> Result<Board> {
    let Value::Object(mut root) = document else {
        return Err(ToolError::InvalidBoard(
            "expected a JSON object at the top level".into(),
        ));
    };

    let labels = take_array(&mut root, "labels")?;
    let lists = take_array(&mut root, "lists")?
        .into_iter()
        .map(parse_list)
        .collect::<Result<Vec<_>>>()?;
    let cards = take_array(&mut root, "cards")?
        .into_iter()
        .map(parse_card)
        .collect::<Result<Vec<_>>>()?;

    Ok(Board {
        labels: LabelSet::Raw(labels),
        lists,
        cards,
    })
}

fn take_array(root: &mut Map<String, Value>, key: &str) -> Result<Vec<Value>> {
    match root.remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ToolError::InvalidBoard(format!("'{key}' is not an array"))),
        None => Err(ToolError::InvalidBoard(format!("missing '{key}' array"))),
    }
}

fn parse_list(value: Value) -> Result<ListInfo> {
    let Value::Object(fields) = value else {
        return Err(ToolError::InvalidBoard("list entries must be objects".into()));
    };
    let id = require_string(&fields, "list", "id")?;
    let name = require_string(&fields, "list", "name")?;
    Ok(ListInfo { id, name, fields })
}

fn parse_card(value: Value) -> Result<Card> {
    let Value::Object(fields) = value else {
        return Err(ToolError::InvalidBoard("card entries must be objects".into()));
    };
    let list_id = require_string(&fields, "card", "idList")?;
    Ok(Card { list_id, fields })
}

fn require_string(
    fields: &Map<String, Value>,
    entity: &str,
    field: &'static str,
) -> Result<String> {
    fields
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolError::MissingField {
            entity: describe_entry(entity, fields),
            field,
        })
}

fn describe_entry(kind: &str, fields: &Map<String, Value>) -> String {
    match fields
        .get("name")
        .or_else(|| fields.get("id"))
        .and_then(Value::as_str)
    {
        Some(tag) => format!("{kind} '{tag}'"),
        None => kind.to_string(),
    }
}
