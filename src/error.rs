use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("No file part")]
    MissingFilePart,
    #[error("No selected file")]
    NoSelectedFile,
    #[error("{path}: missing required column {column:?}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("{path}: department {department:?} appears more than once in the roster")]
    DuplicateDepartment { path: PathBuf, department: String },
    #[error("{path}: workbook has no worksheets")]
    EmptyWorkbook { path: PathBuf },
}

impl InputError {
    /// Errors that are reported to the user as plain text before any processing.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, InputError::MissingFilePart | InputError::NoSelectedFile)
    }
}

/// Checks that a roster and at least one quarterly file were supplied.
pub fn check_inputs(roster: Option<&Path>, quarters: Option<&[PathBuf]>) -> Result<(), InputError> {
    let (Some(roster), Some(quarters)) = (roster, quarters) else {
        return Err(InputError::MissingFilePart);
    };

    if roster.as_os_str().is_empty() || quarters.is_empty() {
        return Err(InputError::NoSelectedFile);
    }

    Ok(())
}
