// core/src/error.rs
use thiserror::Error;

/// Feiltaksonomi for kjernen. Alle varianter kan rettes av brukeren og
/// prøves på nytt; ingen er fatale for prosessen.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Ikke-numerisk, manglende felt eller for få observasjoner.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Gyldig input, men matematisk utilstrekkelig (f.eks. like tider).
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),
    /// Ingen gyldige linjer etter parsing.
    #[error("no valid session lines found")]
    NothingToSimulate,
    /// Økten parser, men har null total varighet.
    #[error("session has zero total duration")]
    EmptySession,
    #[error("no fitted model: {0}")]
    MissingModel(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("json: {0}")]
    Json(String),
    #[error("export: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Json(e.to_string())
    }
}

impl From<quick_xml::Error> for CoreError {
    fn from(e: quick_xml::Error) -> Self {
        CoreError::Export(e.to_string())
    }
}
