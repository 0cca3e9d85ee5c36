use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use calamine::{open_workbook_auto, Data, Reader};

use crate::error::InputError;
use crate::models::{QuarterRecord, RosterRecord};

const DEPARTMENT: &str = "Department";
const EXECUTIVE_HEAD: [&str; 2] = ["Executive Head", "ExecutiveHead"];
const TRAINING_SCORE: [&str; 2] = ["Training Score", "TrainingScore"];
const EMAIL: &str = "Email";

/// Cell values a dataframe reader treats as missing.
const NA_TOKENS: [&str; 18] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A",
    "#N/A N/A", "#NA", "<NA>", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// Department to executive lookup built from the roster file.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    executives: HashMap<String, Option<String>>,
}

impl Roster {
    pub fn from_records(path: &Path, records: Vec<RosterRecord>) -> Result<Self, InputError> {
        let mut executives = HashMap::with_capacity(records.len());

        for record in records {
            if record.department.trim().is_empty() {
                continue;
            }
            let executive = record.executive_head.filter(|name| !name.trim().is_empty());
            if executives.insert(record.department.clone(), executive).is_some() {
                return Err(InputError::DuplicateDepartment {
                    path: path.to_path_buf(),
                    department: record.department,
                });
            }
        }

        Ok(Self { executives })
    }

    pub fn executive_for(&self, department: &str) -> Option<&str> {
        self.executives.get(department).and_then(|exec| exec.as_deref())
    }

    pub fn len(&self) -> usize {
        self.executives.len()
    }
}

pub fn load_roster(path: &Path) -> anyhow::Result<Roster> {
    let records = if has_extension(path, "csv") {
        read_roster_csv(path)?
    } else {
        read_roster_workbook(path)?
    };

    Ok(Roster::from_records(path, records)?)
}

pub fn load_quarter(path: &Path) -> anyhow::Result<Vec<QuarterRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open quarterly file {}", path.display()))?;

    let headers = reader.headers()?.clone();
    require_column(path, &headers, &[DEPARTMENT])?;
    require_column(path, &headers, &TRAINING_SCORE)?;
    require_column(path, &headers, &[EMAIL])?;

    let mut records = Vec::new();
    for result in reader.deserialize::<QuarterRecord>() {
        let row = result.with_context(|| format!("malformed row in {}", path.display()))?;
        records.push(row);
    }

    tracing::debug!(path = %path.display(), rows = records.len(), "quarterly file loaded");
    Ok(records)
}

/// A training score counts as present unless the cell is empty or exactly an NA token.
pub fn is_completed(score: Option<&str>) -> bool {
    match score {
        None | Some("") => false,
        Some(value) => !NA_TOKENS.contains(&value),
    }
}

fn read_roster_csv(path: &Path) -> anyhow::Result<Vec<RosterRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open roster {}", path.display()))?;

    let headers = reader.headers()?.clone();
    require_column(path, &headers, &[DEPARTMENT])?;
    require_column(path, &headers, &EXECUTIVE_HEAD)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<RosterRecord>() {
        records.push(result.with_context(|| format!("malformed row in {}", path.display()))?);
    }
    Ok(records)
}

fn read_roster_workbook(path: &Path) -> anyhow::Result<Vec<RosterRecord>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open roster {}", path.display()))?;
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

    let department_idx = column_index(path, &headers, &[DEPARTMENT])?;
    let executive_idx = column_index(path, &headers, &EXECUTIVE_HEAD)?;

    let records = rows
        .filter_map(|row| {
            let department = row.get(department_idx).and_then(cell_text)?;
            Some(RosterRecord {
                department,
                executive_head: row.get(executive_idx).and_then(cell_text),
            })
        })
        .collect();

    Ok(records)
}

pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(value) if value.is_empty() => None,
        Data::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

fn require_column(
    path: &Path,
    headers: &csv::StringRecord,
    names: &[&str],
) -> Result<(), InputError> {
    let found = headers.iter().any(|header| names.contains(&header));
    if found {
        Ok(())
    } else {
        Err(missing_column(path, names))
    }
}

pub(crate) fn column_index(
    path: &Path,
    headers: &[String],
    names: &[&str],
) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|header| names.contains(&header.as_str()))
        .ok_or_else(|| missing_column(path, names))
}

fn missing_column(path: &Path, names: &[&str]) -> InputError {
    InputError::MissingColumn {
        path: PathBuf::from(path),
        column: names[0].to_string(),
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
