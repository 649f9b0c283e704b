//! knip `--reporter json` output

use serde::{Deserialize, Serialize};

use super::same_file;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnipReport {
    /// Files nothing imports
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub issues: Vec<KnipFileIssues>,
}

/// Per-file issue lists; knip emits more categories than are read here
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnipFileIssues {
    pub file: String,
    #[serde(default)]
    pub dependencies: Vec<KnipSymbol>,
    #[serde(default)]
    pub dev_dependencies: Vec<KnipSymbol>,
    #[serde(default)]
    pub unlisted: Vec<KnipSymbol>,
    #[serde(default)]
    pub exports: Vec<KnipSymbol>,
    #[serde(default)]
    pub types: Vec<KnipSymbol>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnipSymbol {
    pub name: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub col: Option<u32>,
}

impl KnipReport {
    pub fn is_unused_file(&self, file_name: &str, project_root: &str) -> bool {
        self.files
            .iter()
            .any(|reported| same_file(reported, file_name, project_root))
    }

    pub fn issues_for(&self, file_name: &str, project_root: &str) -> Option<&KnipFileIssues> {
        self.issues
            .iter()
            .find(|issues| same_file(&issues.file, file_name, project_root))
    }

    /// Unused exports and exported types across the project
    pub fn unused_export_count(&self) -> usize {
        self.issues
            .iter()
            .map(|issues| issues.exports.len() + issues.types.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"{
        "files": ["src/old.ts"],
        "issues": [
            {
                "file": "package.json",
                "dependencies": [{"name": "left-pad"}],
                "devDependencies": [{"name": "jest"}],
                "exports": [],
                "duplicates": [[{"name": "a"}, {"name": "b"}]]
            },
            {
                "file": "src/api.ts",
                "exports": [{"name": "handler", "line": 4, "col": 14}, {"name": "legacy", "line": 30, "col": 1}],
                "types": [{"name": "Payload", "line": 1, "col": 13}]
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_lookup() {
        let report: KnipReport = serde_json::from_str(OUTPUT).unwrap();

        assert_eq!(report.unused_export_count(), 3);
        assert!(report.is_unused_file("/app/src/old.ts", "/app"));
        assert!(!report.is_unused_file("/app/src/api.ts", "/app"));

        let package = report.issues_for("package.json", "/app").unwrap();
        assert_eq!(package.dev_dependencies[0].name, "jest");
        assert_eq!(package.dependencies[0].line, None);

        let api = report.issues_for("src/api.ts", "/app").unwrap();
        assert_eq!(api.exports[0].col, Some(14));
    }

    #[test]
    fn test_empty_object() {
        let report: KnipReport = serde_json::from_str("{}").unwrap();
        assert_eq!(report, KnipReport::default());
    }
}
