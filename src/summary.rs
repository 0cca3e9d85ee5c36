use std::collections::BTreeMap;

use crate::config::PipelineConfig;
use crate::ingest::{self, Roster};
use crate::models::{ExecutiveSummary, GrandTotal, JoinedRecord, QuarterRecord, SummaryTable};

/// Left-joins one quarter's rows onto the roster and tags them with the quarter label.
pub fn join_quarter(roster: &Roster, quarter: &str, records: Vec<QuarterRecord>) -> Vec<JoinedRecord> {
    records
        .into_iter()
        .map(|record| {
            let executive_head = record
                .department
                .as_deref()
                .and_then(|department| roster.executive_for(department))
                .map(str::to_string);

            JoinedRecord {
                completed: ingest::is_completed(record.training_score.as_deref()),
                department: record.department,
                executive_head,
                email: record.email,
                quarter: quarter.to_string(),
            }
        })
        .collect()
}

pub fn completion_percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

/// Groups joined rows by executive, ordered by name. Rows with no executive are dropped.
pub fn summarize_executives(records: &[JoinedRecord], quarters: &[String]) -> Vec<ExecutiveSummary> {
    // (rows, completed) per quarter, indexed like `quarters`
    let mut groups: BTreeMap<&str, Vec<(usize, usize)>> = BTreeMap::new();

    for record in records {
        let Some(executive) = record.executive_head.as_deref() else {
            continue;
        };
        let counts = groups
            .entry(executive)
            .or_insert_with(|| vec![(0, 0); quarters.len()]);

        if let Some(idx) = quarters.iter().position(|q| *q == record.quarter) {
            counts[idx].0 += 1;
            if record.completed {
                counts[idx].1 += 1;
            }
        }
    }

    groups
        .into_iter()
        .map(|(executive, counts)| ExecutiveSummary {
            executive_head: executive.to_string(),
            total_members: counts.iter().map(|(rows, _)| rows).sum(),
            percentages: counts
                .iter()
                .map(|(rows, completed)| completion_percentage(*completed, *rows))
                .collect(),
        })
        .collect()
}

pub fn filter_included(rows: Vec<ExecutiveSummary>, config: &PipelineConfig) -> Vec<ExecutiveSummary> {
    rows.into_iter()
        .filter(|row| config.is_included(&row.executive_head))
        .collect()
}

/// Sums member counts and takes the unweighted mean of each quarter's percentage.
/// With no rows the means are undefined.
pub fn grand_total(rows: &[ExecutiveSummary], quarter_count: usize, label: &str) -> GrandTotal {
    let percentages = (0..quarter_count)
        .map(|idx| {
            if rows.is_empty() {
                return None;
            }
            let sum: f64 = rows.iter().map(|row| row.percentages[idx]).sum();
            Some(sum / rows.len() as f64)
        })
        .collect();

    GrandTotal {
        label: label.to_string(),
        total_members: rows.iter().map(|row| row.total_members).sum(),
        percentages,
    }
}

pub fn build_summary(records: &[JoinedRecord], config: &PipelineConfig) -> SummaryTable {
    let all_rows = summarize_executives(records, &config.quarters);
    let grouped = all_rows.len();
    let rows = filter_included(all_rows, config);
    let grand_total = grand_total(&rows, config.quarters.len(), &config.grand_total_label);

    tracing::info!(
        executives = grouped,
        included = rows.len(),
        total_members = grand_total.total_members,
        "summary computed"
    );

    SummaryTable {
        quarters: config.quarters.clone(),
        rows,
        grand_total,
    }
}
