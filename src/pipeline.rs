use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::chart;
use crate::config::PipelineConfig;
use crate::error;
use crate::ingest;
use crate::models::{JoinedRecord, SummaryTable};
use crate::report;
use crate::summary;

#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub roster: PathBuf,
    pub quarters: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub spreadsheet: PathBuf,
    pub chart: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path, spreadsheet: &Path, chart: &Path) -> Self {
        Self {
            spreadsheet: dir.join(spreadsheet),
            chart: dir.join(chart),
        }
    }
}

/// Loads every input and joins each quarter onto the roster.
pub fn load_joined(inputs: &PipelineInputs, config: &PipelineConfig) -> anyhow::Result<Vec<JoinedRecord>> {
    error::check_inputs(Some(inputs.roster.as_path()), Some(inputs.quarters.as_slice()))?;
    config.validate()?;

    let roster = ingest::load_roster(&inputs.roster)?;
    tracing::info!(
        path = %inputs.roster.display(),
        departments = roster.len(),
        "roster loaded"
    );

    if inputs.quarters.len() > config.quarters.len() {
        for extra in &inputs.quarters[config.quarters.len()..] {
            tracing::warn!(path = %extra.display(), "no quarter label left for file, ignoring it");
        }
    }

    let mut joined = Vec::new();
    for (quarter, path) in config.quarters.iter().zip(inputs.quarters.iter()) {
        let records = ingest::load_quarter(path)
            .with_context(|| format!("failed to load quarter {quarter}"))?;
        let rows = summary::join_quarter(&roster, quarter, records);

        let unmatched: Vec<&JoinedRecord> =
            rows.iter().filter(|row| row.executive_head.is_none()).collect();
        for row in &unmatched {
            tracing::debug!(
                quarter = %quarter,
                department = row.department.as_deref().unwrap_or(""),
                email = row.email.as_deref().unwrap_or(""),
                "row has no executive"
            );
        }
        tracing::info!(
            quarter = %quarter,
            path = %path.display(),
            rows = rows.len(),
            unmatched = unmatched.len(),
            "quarter joined"
        );

        joined.extend(rows);
    }

    Ok(joined)
}

/// Join, group, filter and total, without writing anything.
pub fn summarize(inputs: &PipelineInputs, config: &PipelineConfig) -> anyhow::Result<SummaryTable> {
    let joined = load_joined(inputs, config)?;
    Ok(summary::build_summary(&joined, config))
}

/// Full run: summarize, then persist the spreadsheet and chart.
pub fn run(
    inputs: &PipelineInputs,
    config: &PipelineConfig,
    outputs: &OutputPaths,
) -> anyhow::Result<SummaryTable> {
    let table = summarize(inputs, config)?;

    report::write_spreadsheet(&table, &outputs.spreadsheet)?;
    tracing::info!(path = %outputs.spreadsheet.display(), "spreadsheet written");

    chart::render_chart(&table.quarters, &table.to_rows(), &outputs.chart)?;
    tracing::info!(path = %outputs.chart.display(), "chart written");

    Ok(table)
}
