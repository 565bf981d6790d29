//! Pipe tables.

use super::inline::parse_inline;
use super::lines::{is_table_row, TABLE_SEPARATOR};
use crate::model::{Block, BlockCommon, TableBlock, TableRow};

/// Parses the contiguous pipe rows starting at `start`.
///
/// A separator as the second row marks the first row as a header. The first
/// row fixes the width; shorter rows are padded with empty cells and longer
/// rows are truncated.
pub(crate) fn parse_table(lines: &[&str], start: usize) -> (Block, usize) {
    let end = (start..lines.len())
        .find(|&i| !is_table_row(lines[i]))
        .unwrap_or(lines.len());
    let raw_rows = &lines[start..end];

    let has_header = raw_rows.len() >= 2 && TABLE_SEPARATOR.is_match(raw_rows[1].trim());
    let mut cells: Vec<Vec<String>> = raw_rows
        .iter()
        .enumerate()
        .filter(|(i, _)| !(has_header && *i == 1))
        .map(|(_, row)| split_cells(row))
        .collect();

    let width = cells.first().map(Vec::len).unwrap_or(0);
    for row in &mut cells {
        row.resize(width, String::new());
    }

    let rows: Vec<TableRow> = cells
        .into_iter()
        .map(|row| {
            row.iter()
                .map(|cell| parse_inline(cell.trim()))
                .collect()
        })
        .collect();

    let block = Block::Table(TableBlock {
        common: BlockCommon::default(),
        has_header,
        rows,
    });
    (block, end.max(start + 1))
}

/// Splits a row on unescaped pipes, dropping the outer ones.
///
/// `\|` becomes a literal pipe in the cell; other escapes are left for the
/// inline parser.
fn split_cells(row: &str) -> Vec<String> {
    let mut body = row.trim();
    body = body.strip_prefix('|').unwrap_or(body);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars();
    let mut trailing_pipe = false;

    while let Some(c) = chars.next() {
        trailing_pipe = false;
        match c {
            '\\' => match chars.next() {
                Some('|') => current.push('|'),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            '|' => {
                cells.push(std::mem::take(&mut current));
                trailing_pipe = true;
            }
            _ => current.push(c),
        }
    }
    if !trailing_pipe || !current.is_empty() {
        cells.push(current);
    }
    cells
}
