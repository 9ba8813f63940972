//! Error types for batch translation

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error coming out of the inference engine or its loader
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by batches, options and translators
#[derive(Error, Debug)]
pub enum Error {
    /// Sentence index at or beyond the batch length
    #[error("index {index} out of range for batch of length {length}")]
    OutOfRange { index: usize, length: usize },

    /// The engine could not be constructed for this model
    #[error("failed to load model from '{}': {source}", path.display())]
    ModelLoad { path: PathBuf, source: BoxedError },

    /// Failure reported by the engine during a translate call
    #[error("engine error: {0}")]
    Engine(BoxedError),

    /// One target prefix token is required per input sentence
    #[error("target has {target} entries but batch has {data} sentences")]
    TargetLengthMismatch { data: usize, target: usize },

    /// The engine returned a different number of results than inputs
    #[error("engine returned {got} results for {expected} inputs")]
    ResultCountMismatch { expected: usize, got: usize },

    /// A result carried no hypothesis to extract
    #[error("result {index} has no output hypothesis")]
    MissingOutput { index: usize },

    /// Options JSON could not be parsed
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// Options file could not be read or parsed
    #[error("invalid options file '{}': {source}", path.display())]
    OptionsFile { path: PathBuf, source: BoxedError },
}

impl Error {
    /// Wrap any engine-side failure without altering it
    pub fn engine<E>(err: E) -> Self
    where
        E: Into<BoxedError>,
    {
        Error::Engine(err.into())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_out_of_range_message() {
        let err = Error::OutOfRange {
            index: 3,
            length: 2,
        };
        assert_eq!(err.to_string(), "index 3 out of range for batch of length 2");
    }

    #[test]
    fn test_model_load_keeps_source() {
        let err = Error::ModelLoad {
            path: PathBuf::from("models/missing"),
            source: "no model.bin".into(),
        };
        assert!(err.to_string().contains("models/missing"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("no model.bin"));
    }

    #[test]
    fn test_engine_error_passes_message_through() {
        let err = Error::engine("CUDA out of memory");
        assert_eq!(err.to_string(), "engine error: CUDA out of memory");
    }
}
