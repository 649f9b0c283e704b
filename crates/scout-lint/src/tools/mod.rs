//! Whole-project analysis tools (knip, jscpd)

mod jscpd;
mod knip;
mod runner;

pub use jscpd::{CloneRef, JscpdDuplicate, JscpdLocation, JscpdReport};
pub use knip::{KnipFileIssues, KnipReport, KnipSymbol};
pub use runner::{ToolRunner, ToolSettings};

/// Whether a path from a tool report names the file being linted
///
/// Reports use paths relative to the project root; the linter may see either
/// relative or absolute paths.
pub(crate) fn same_file(reported: &str, file_name: &str, project_root: &str) -> bool {
    let reported = normalize(reported);
    let file_name = normalize(file_name);
    if reported.is_empty() {
        return false;
    }
    if file_name == reported {
        return true;
    }

    let root = normalize(project_root);
    let root = root.trim_end_matches('/');
    file_name == format!("{root}/{reported}") || file_name.ends_with(&format!("/{reported}"))
}

fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").map(str::to_string).unwrap_or(path)
}
