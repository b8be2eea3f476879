use std::collections::BTreeMap;

use tracing::info;

use crate::error::{Result, ToolError};
use crate::model::{Board, Label, LabelSet};

/// Replaces the board's raw label array with an id → name mapping.
///
/// Resolving a board whose labels are already resolved is a no-op.
pub fn resolve_labels(board: &mut Board) -> Result<()> {
    let raw = match &mut board.labels {
        LabelSet::Raw(entries) => std::mem::take(entries),
        LabelSet::Resolved(_) => return Ok(()),
    };

    let mut resolved = BTreeMap::new();
    for entry in raw {
        let label: Label = serde_json::from_value(entry)
            .map_err(|err| ToolError::InvalidBoard(format!("malformed label entry: {err}")))?;
        resolved.insert(label.id, label.name);
    }

    info!(label_count = resolved.len(), "label names resolved");
    board.labels = LabelSet::Resolved(resolved);
    Ok(())
}
