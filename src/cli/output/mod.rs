pub mod github;
pub mod json;
pub mod text;

use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::types::CheckResult;

pub fn render(result: &CheckResult, project_root: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => text::render(result, project_root),
        OutputFormat::Json => json::render(result, project_root)?,
        OutputFormat::Github => github::render(result, project_root),
    }
    Ok(())
}

fn relative_path(file: &Path, project_root: &Path) -> String {
    let rel = file.strip_prefix(project_root).unwrap_or(file);
    if rel.as_os_str().is_empty() {
        // `check` was given a single file
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        rel.display().to_string()
    }
}
