use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::Result;
use crate::flatten::{SheetTable, WorkbookData};
use crate::model::CellValue;

/// Writes the provided workbook data to the given path.
///
/// Sheet names are passed to the writer untouched; invalid or duplicate
/// names surface as [`rust_xlsxwriter`] errors and abort the run.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let bold = Format::new().set_bold();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;
        write_table(worksheet, table, &bold)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &SheetTable, bold: &Format) -> Result<()> {
    let mut row = 0u32;

    if let Some(info) = &table.list_info {
        for (col, key) in info.keys.iter().enumerate() {
            worksheet.write_string_with_format(row, col as u16, key, bold)?;
        }
        for (col, value) in info.values.iter().enumerate() {
            write_cell(worksheet, row + 1, col as u16, value)?;
        }
        row += 2;
    }

    if !table.columns.is_empty() {
        for (col, column) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(row, col as u16, column, bold)?;
        }
        row += 1;
    }

    for cells in &table.rows {
        for (col, cell) in cells.iter().enumerate() {
            write_cell(worksheet, row, col as u16, cell)?;
        }
        row += 1;
    }

    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    match value {
        CellValue::Text(text) => worksheet.write_string(row, col, text)?,
        CellValue::Number(number) => worksheet.write_number(row, col, *number)?,
        CellValue::Boolean(flag) => worksheet.write_boolean(row, col, *flag)?,
        CellValue::Empty => return Ok(()),
    };
    Ok(())
}
