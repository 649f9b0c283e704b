//! jscpd `--reporters json` output (`jscpd-report.json`)

use serde::{Deserialize, Serialize};

use super::same_file;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JscpdReport {
    #[serde(default)]
    pub duplicates: Vec<JscpdDuplicate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JscpdDuplicate {
    #[serde(default)]
    pub format: String,
    pub lines: u32,
    #[serde(default)]
    pub fragment: String,
    pub first_file: JscpdLocation,
    pub second_file: JscpdLocation,
}

/// One side of a clone; lines are 1-based and inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JscpdLocation {
    pub name: String,
    pub start: u32,
    pub end: u32,
}

/// A clone as seen from one of its files
#[derive(Debug, Clone, Copy)]
pub struct CloneRef<'r> {
    pub here: &'r JscpdLocation,
    pub other: &'r JscpdLocation,
    pub lines: u32,
}

impl JscpdReport {
    /// Clones with at least one side in `file_name`
    ///
    /// A clone with both sides in the same file yields two entries.
    pub fn clones_in<'r>(&'r self, file_name: &str, project_root: &str) -> Vec<CloneRef<'r>> {
        let mut found = Vec::new();
        for duplicate in &self.duplicates {
            if same_file(&duplicate.first_file.name, file_name, project_root) {
                found.push(CloneRef {
                    here: &duplicate.first_file,
                    other: &duplicate.second_file,
                    lines: duplicate.lines,
                });
            }
            if same_file(&duplicate.second_file.name, file_name, project_root) {
                found.push(CloneRef {
                    here: &duplicate.second_file,
                    other: &duplicate.first_file,
                    lines: duplicate.lines,
                });
            }
        }
        found
    }

    pub fn duplicated_lines(&self) -> u32 {
        self.duplicates.iter().map(|d| d.lines).sum()
    }
}
