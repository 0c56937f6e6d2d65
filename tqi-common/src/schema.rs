//! JSON Schema generation for the analysis contract.
//!
//! Ingestion and presentation collaborators live outside this workspace;
//! the schemas exported here are how they track the contract without
//! sharing Rust types.
//!
//! # Generated Schemas
//!
//! - `quality-report.schema.json` - the full result tree
//! - `test-outcome.schema.json` - one current-run record
//! - `historical-run.schema.json` - one prior-execution record
//! - `analysis-config.schema.json` - the configuration document

use crate::config::AnalysisConfig;
use crate::report::QualityReport;
use crate::types::{HistoricalRun, TestOutcome};
use schemars::schema::RootSchema;
use schemars::schema_for;

/// Generate the JSON Schema for [`QualityReport`].
#[must_use]
pub fn generate_report_schema() -> RootSchema {
    schema_for!(QualityReport)
}

/// Generate the JSON Schema for [`TestOutcome`].
#[must_use]
pub fn generate_outcome_schema() -> RootSchema {
    schema_for!(TestOutcome)
}

/// Generate the JSON Schema for [`HistoricalRun`].
#[must_use]
pub fn generate_history_schema() -> RootSchema {
    schema_for!(HistoricalRun)
}

/// Generate the JSON Schema for [`AnalysisConfig`].
#[must_use]
pub fn generate_config_schema() -> RootSchema {
    schema_for!(AnalysisConfig)
}

/// Summary of a schema export run.
#[derive(Debug, Clone)]
pub struct SchemaExportResult {
    pub files_generated: usize,
    pub files: Vec<String>,
    pub output_dir: String,
}

/// Write every contract schema into `output_dir` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if directory creation or file writing fails.
pub fn export_schemas(output_dir: &std::path::Path) -> std::io::Result<SchemaExportResult> {
    use std::fs;

    fs::create_dir_all(output_dir)?;

    let schemas: [(&str, RootSchema); 4] = [
        ("quality-report.schema.json", generate_report_schema()),
        ("test-outcome.schema.json", generate_outcome_schema()),
        ("historical-run.schema.json", generate_history_schema()),
        ("analysis-config.schema.json", generate_config_schema()),
    ];

    let mut files = Vec::new();
    for (name, schema) in &schemas {
        let path = output_dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(schema)?)?;
        files.push(path.display().to_string());
    }

    Ok(SchemaExportResult {
        files_generated: files.len(),
        files,
        output_dir: output_dir.display().to_string(),
    })
}
