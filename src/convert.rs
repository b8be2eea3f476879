use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::flatten::{self, LayoutOptions};
use crate::io::{board, excel_write};
use crate::labels;

/// Options selected on the command line that steer the conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Resolve card label references to their display names.
    pub resolve_labels: bool,
    /// Layout switches forwarded to the sheet builder.
    pub layout: LayoutOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            resolve_labels: true,
            layout: LayoutOptions::default(),
        }
    }
}

/// Converts a Trello board export into an XLSX workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn board_to_excel(input: &Path, output: &Path, options: ConvertOptions) -> Result<()> {
    let mut board = board::load_board(input)?;
    info!(
        list_count = board.lists.len(),
        card_count = board.cards.len(),
        "board export loaded"
    );

    if options.resolve_labels {
        labels::resolve_labels(&mut board)?;
    }

    let workbook = flatten::build_workbook(&board, options.layout)?;
    debug!(sheet_count = workbook.tables.len(), "workbook laid out");
    excel_write::write_workbook(output, &workbook)
}
