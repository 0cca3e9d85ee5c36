use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::InputError;
use crate::ingest::{cell_text, column_index};
use crate::models::{SummaryRow, SummaryTable};

const EXECUTIVE_COLUMN: &str = "Executive Head";
const MEMBERS_COLUMN: &str = "Total Members";

pub fn write_spreadsheet(table: &SummaryTable, path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    sheet.write_string_with_format(0, 0, EXECUTIVE_COLUMN, &header)?;
    sheet.write_string_with_format(0, 1, MEMBERS_COLUMN, &header)?;
    for (idx, quarter) in table.quarters.iter().enumerate() {
        sheet.write_string_with_format(0, (idx + 2) as u16, quarter, &header)?;
    }

    for (offset, row) in table.to_rows().iter().enumerate() {
        let line = (offset + 1) as u32;
        sheet.write_string(line, 0, &row.executive_head)?;
        sheet.write_number(line, 1, row.total_members as f64)?;
        for (idx, pct) in row.percentages.iter().enumerate() {
            if let Some(value) = pct {
                sheet.write_number(line, (idx + 2) as u16, *value)?;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to write spreadsheet {}", path.display()))?;
    Ok(())
}

/// Reads a spreadsheet produced by [`write_spreadsheet`]. Returns the quarter
/// labels and every row, grand total included.
pub fn read_summary(path: &Path) -> anyhow::Result<(Vec<String>, Vec<SummaryRow>)> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open spreadsheet {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InputError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .with_context(|| format!("failed to read first worksheet of {}", path.display()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|cell| cell_text(cell).unwrap_or_default()).collect())
        .unwrap_or_default();

    let executive_idx = column_index(path, &headers, &[EXECUTIVE_COLUMN])?;
    let members_idx = column_index(path, &headers, &[MEMBERS_COLUMN])?;
    let quarter_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, name)| *idx != executive_idx && *idx != members_idx && !name.is_empty())
        .map(|(idx, name)| (idx, name.clone()))
        .collect();

    let mut summary = Vec::new();
    for row in rows {
        let Some(executive_head) = row.get(executive_idx).and_then(cell_text) else {
            continue;
        };
        let total_members = row.get(members_idx).and_then(cell_number).unwrap_or(0.0) as usize;
        let percentages = quarter_columns
            .iter()
            .map(|(idx, _)| row.get(*idx).and_then(cell_number))
            .collect();

        summary.push(SummaryRow {
            executive_head,
            total_members,
            percentages,
        });
    }

    let quarters = quarter_columns.into_iter().map(|(_, name)| name).collect();
    Ok((quarters, summary))
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::String(value) => value.trim().parse().ok(),
        _ => None,
    }
}

pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(pct) => format!("{pct:.2}%"),
        None => "n/a".to_string(),
    }
}

/// Renders rows as a plain-text table for the terminal.
pub fn render_table(quarters: &[String], rows: &[SummaryRow]) -> String {
    let name_width = rows
        .iter()
        .map(|row| row.executive_head.chars().count())
        .chain(std::iter::once(EXECUTIVE_COLUMN.len()))
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    let _ = write!(output, "{:<name_width$}  {:>13}", EXECUTIVE_COLUMN, MEMBERS_COLUMN);
    for quarter in quarters {
        let _ = write!(output, "  {:>8}", quarter);
    }
    let _ = writeln!(output);

    for row in rows {
        let _ = write!(
            output,
            "{:<name_width$}  {:>13}",
            row.executive_head, row.total_members
        );
        for pct in &row.percentages {
            let _ = write!(output, "  {:>8}", format_percentage(*pct));
        }
        let _ = writeln!(output);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExecutiveSummary, GrandTotal};

    fn sample_table() -> SummaryTable {
        SummaryTable {
            quarters: vec!["JFM".to_string(), "AMJ".to_string()],
            rows: vec![
                ExecutiveSummary {
                    executive_head: "Exec1".to_string(),
                    total_members: 4,
                    percentages: vec![100.0, 50.0],
                },
                ExecutiveSummary {
                    executive_head: "Exec2".to_string(),
                    total_members: 2,
                    percentages: vec![0.0, 25.0],
                },
            ],
            grand_total: GrandTotal {
                label: "Grand Total".to_string(),
                total_members: 6,
                percentages: vec![Some(50.0), Some(37.5)],
            },
        }
    }

    #[test]
    fn spreadsheet_reads_back_with_grand_total() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("summary.xlsx");
        let table = sample_table();

        write_spreadsheet(&table, &path).unwrap();
        let (quarters, rows) = read_summary(&path).unwrap();

        assert_eq!(quarters, vec!["JFM", "AMJ"]);
        assert_eq!(rows.len(), table.rows.len() + 1);
        assert_eq!(rows, table.to_rows());
        assert_eq!(rows[2].executive_head, "Grand Total");
    }

    #[test]
    fn undefined_percentages_read_back_as_empty() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("empty.xlsx");
        let table = SummaryTable {
            quarters: vec!["Q1".to_string()],
            rows: Vec::new(),
            grand_total: GrandTotal {
                label: "Grand Total".to_string(),
                total_members: 0,
                percentages: vec![None],
            },
        };

        write_spreadsheet(&table, &path).unwrap();
        let (_, rows) = read_summary(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_members, 0);
        assert_eq!(rows[0].percentages, vec![None]);
    }

    #[test]
    fn table_lists_every_row() {
        let table = sample_table();
        let text = render_table(&table.quarters, &table.to_rows());

        assert!(text.starts_with("Executive Head"));
        assert!(text.contains("Exec2"));
        assert!(text.contains("37.50%"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn table_with_only_grand_total_prints_one_row() {
        let rows = vec![SummaryRow {
            executive_head: "Grand Total".to_string(),
            total_members: 0,
            percentages: vec![None],
        }];
        let text = render_table(&["Q1".to_string()], &rows);

        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().starts_with("Grand Total"));
        assert!(text.contains("n/a"));
    }

    #[test]
    fn undefined_percentage_prints_as_na() {
        assert_eq!(format_percentage(None), "n/a");
        assert_eq!(format_percentage(Some(12.5)), "12.50%");
    }
}
