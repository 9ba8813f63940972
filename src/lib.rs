//! Batched translation over a CTranslate2 model
//!
//! This crate moves already-tokenized text to a sequence-to-sequence
//! translation engine and back. Batches are owned values, decoding options
//! are one immutable record, and the engine sits behind a trait so the
//! pipeline can run against a mock.
//!
//! # Workflow Example
//!
//! ```
//! use rusty_ctranslate2::{
//!     BatchData, BatchType, MockEngine, MockMode, TranslationOptions, Translator,
//! };
//!
//! // With the `ctranslate2` feature: Translator::new("model_dir", use_gpu, fast)?
//! let translator = Translator::with_engine(MockEngine::new(MockMode::Reverse));
//!
//! // 1. Build the batch
//! let mut data = BatchData::new();
//! data.append(vec!["Hello".to_string(), "world".to_string()]);
//!
//! // 2. Decoding options, defaults for anything not named
//! let options = TranslationOptions::builder().with_beam_size(4).build();
//!
//! // 3. Translate
//! let result = translator
//!     .translate_batch(&data, &options, 0, BatchType::Examples)
//!     .unwrap();
//! assert_eq!(result.get(0).unwrap(), vec!["world", "Hello"]);
//! ```

pub mod batch;
pub mod engine;
pub mod error;
pub mod mock;
pub mod options;
pub mod translator;

#[cfg(feature = "ctranslate2")]
pub mod ctranslate2;

#[cfg(test)]
mod integration_tests;

// Re-export main types for convenient access
pub use batch::BatchData;
pub use engine::{
    BatchType, ComputeType, Device, EngineConfig, EngineLoader, TranslationEngine,
    TranslationResult,
};
pub use error::{Error, Result};
pub use mock::{MockEngine, MockLoader, MockMode};
pub use options::{TranslationOptions, TranslationOptionsBuilder};
pub use translator::Translator;

#[cfg(feature = "ctranslate2")]
pub use ctranslate2::{Ct2Engine, Ct2Loader};
