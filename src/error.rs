use thiserror::Error;

/// Failure modes surfaced by the analysis pipeline.
///
/// `analyze` always returns either a full report or one of these variants;
/// unexpected internal failures are folded into [`AnalysisError::Failed`] at
/// the orchestrator boundary rather than propagating as-is.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(
        "could not detect an item column: no header matched the known synonyms and no string-like column is available as a fallback"
    )]
    NoItemColumn,
    #[error("input table has no data rows")]
    EmptyInput,
    #[error("analysis failed: {0}")]
    Failed(String),
}
