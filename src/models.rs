use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RosterRecord {
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Executive Head", alias = "ExecutiveHead")]
    pub executive_head: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuarterRecord {
    #[serde(rename = "Department")]
    pub department: Option<String>,
    #[serde(rename = "Training Score", alias = "TrainingScore")]
    pub training_score: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
}

/// A quarterly row after the roster join, tagged with its quarter.
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub department: Option<String>,
    pub executive_head: Option<String>,
    pub email: Option<String>,
    pub quarter: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutiveSummary {
    pub executive_head: String,
    pub total_members: usize,
    /// One entry per configured quarter, in configuration order.
    pub percentages: Vec<f64>,
}

/// Synthetic aggregate over the filtered executives. A percentage is `None`
/// when there were no rows to average.
#[derive(Debug, Clone, PartialEq)]
pub struct GrandTotal {
    pub label: String,
    pub total_members: usize,
    pub percentages: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub quarters: Vec<String>,
    pub rows: Vec<ExecutiveSummary>,
    pub grand_total: GrandTotal,
}

/// A row as persisted in the output spreadsheet, grand total included.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub executive_head: String,
    pub total_members: usize,
    pub percentages: Vec<Option<f64>>,
}

impl SummaryTable {
    pub fn to_rows(&self) -> Vec<SummaryRow> {
        let mut rows: Vec<SummaryRow> = self
            .rows
            .iter()
            .map(|row| SummaryRow {
                executive_head: row.executive_head.clone(),
                total_members: row.total_members,
                percentages: row.percentages.iter().copied().map(Some).collect(),
            })
            .collect();

        rows.push(SummaryRow {
            executive_head: self.grand_total.label.clone(),
            total_members: self.grand_total.total_members,
            percentages: self.grand_total.percentages.clone(),
        });
        rows
    }
}
