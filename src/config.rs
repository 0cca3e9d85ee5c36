use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SPREADSHEET: &str = "filtered_executive_summary.xlsx";
pub const DEFAULT_CHART: &str = "filtered_executive_summary_chart.png";

const DEFAULT_QUARTERS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

const DEFAULT_EXECUTIVES: [&str; 12] = [
    "Ajoy Singh",
    "Ashwath Bhat",
    "Dylan Dias",
    "Manish Tiwari",
    "Mrunali Majmudar Sathe",
    "Natwar Mall",
    "Rasesh Shah",
    "Rohini Singh",
    "Sandeep Dutta",
    "Sankar SN Narayanan",
    "Satish Raman",
    "Shailendra Singh",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Quarter labels, paired positionally with the quarterly input files.
    pub quarters: Vec<String>,
    /// Executives kept in the filtered table and the grand total.
    pub included_executives: Vec<String>,
    pub grand_total_label: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quarters: DEFAULT_QUARTERS.iter().map(|q| q.to_string()).collect(),
            included_executives: DEFAULT_EXECUTIVES.iter().map(|e| e.to_string()).collect(),
            grand_total_label: "Grand Total".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(path, body)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.quarters.is_empty() {
            bail!("at least one quarter label is required");
        }

        let mut seen = HashSet::new();
        for quarter in &self.quarters {
            if quarter.trim().is_empty() {
                bail!("quarter labels must not be blank");
            }
            if !seen.insert(quarter.as_str()) {
                bail!("duplicate quarter label {quarter:?}");
            }
        }

        if self.grand_total_label.trim().is_empty() {
            bail!("grand total label must not be blank");
        }

        Ok(())
    }

    pub fn is_included(&self, executive: &str) -> bool {
        self.included_executives.iter().any(|name| name == executive)
    }

    pub fn with_included(mut self, executives: Vec<String>) -> Self {
        if !executives.is_empty() {
            self.included_executives = executives;
        }
        self
    }
}
