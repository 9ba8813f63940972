//! Inference engine abstraction
//!
//! The [`Translator`](crate::Translator) never talks to a model directly. It
//! drives a [`TranslationEngine`], which is the opaque capability
//! "batch of token sequences + options -> batch of hypotheses". Engines are
//! created by an [`EngineLoader`] from an [`EngineConfig`], which keeps the
//! real CTranslate2 backend and test doubles interchangeable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BoxedError, Error, Result};
use crate::options::TranslationOptions;

/// Device the model is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    Cuda,
}

/// Numeric precision the model runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeType {
    /// Whatever precision the model was converted with
    Default,
    /// 8-bit integer quantization, used for fast CPU inference
    Int8,
    /// Half precision, used for fast GPU inference
    Float16,
}

/// Unit used when the engine splits a batch into sub-batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchType {
    /// `max_batch_size` counts sentences
    #[default]
    Examples,
    /// `max_batch_size` counts tokens
    Tokens,
}

impl BatchType {
    /// Map the boundary flag `batch_type_is_examples`
    pub fn from_examples_flag(is_examples: bool) -> Self {
        if is_examples {
            BatchType::Examples
        } else {
            BatchType::Tokens
        }
    }
}

impl fmt::Display for BatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchType::Examples => write!(f, "examples"),
            BatchType::Tokens => write!(f, "tokens"),
        }
    }
}

impl std::str::FromStr for BatchType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "examples" | "example" => Ok(BatchType::Examples),
            "tokens" | "token" => Ok(BatchType::Tokens),
            other => Err(format!("unknown batch type '{}'", other)),
        }
    }
}

/// Everything needed to construct one engine instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub model_path: PathBuf,
    pub device: Device,
    pub compute_type: ComputeType,
    /// Devices the model is replicated on; always a single index 0 here
    pub device_indices: Vec<i32>,
}

impl EngineConfig {
    /// Resolve device and precision from the two boundary flags
    ///
    /// | use_gpu | fast  | device | compute type |
    /// |---------|-------|--------|--------------|
    /// | true    | true  | Cuda   | Float16      |
    /// | false   | true  | Cpu    | Int8         |
    /// | true    | false | Cuda   | Default      |
    /// | false   | false | Cpu    | Default      |
    pub fn resolve(model_path: &Path, use_gpu: bool, fast: bool) -> Self {
        let device = if use_gpu { Device::Cuda } else { Device::Cpu };
        let compute_type = match (fast, use_gpu) {
            (true, true) => ComputeType::Float16,
            (true, false) => ComputeType::Int8,
            (false, _) => ComputeType::Default,
        };

        Self {
            model_path: model_path.to_path_buf(),
            device,
            compute_type,
            device_indices: vec![0],
        }
    }
}

/// One translated example as returned by the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationResult {
    /// Hypotheses, best first
    pub hypotheses: Vec<Vec<String>>,
    /// One score per hypothesis when scores were requested
    pub scores: Vec<f32>,
}

impl TranslationResult {
    pub fn new(hypotheses: Vec<Vec<String>>) -> Self {
        Self {
            hypotheses,
            scores: Vec::new(),
        }
    }

    /// Best hypothesis, if any
    pub fn output(&self) -> Option<&Vec<String>> {
        self.hypotheses.first()
    }

    /// Take ownership of the best hypothesis
    pub fn into_output(self) -> Option<Vec<String>> {
        self.hypotheses.into_iter().next()
    }

    pub fn score(&self) -> Option<f32> {
        self.scores.first().copied()
    }
}

/// Batched sequence-to-sequence engine
///
/// Implementations must return exactly one result per source sentence, in
/// source order. Methods take `&self` and engines must be `Sync`: a
/// translator may be shared between threads and calls reach the engine
/// without extra locking.
pub trait TranslationEngine: Send + Sync {
    /// Translate a batch of token sequences
    ///
    /// `max_batch_size == 0` lets the engine pick its own sub-batch size.
    fn translate_batch(
        &self,
        source: &[Vec<String>],
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> std::result::Result<Vec<TranslationResult>, BoxedError>;

    /// Translate a batch where each output is constrained by a target prefix
    ///
    /// `target_prefix[i]` applies to `source[i]`.
    fn translate_batch_with_target_prefix(
        &self,
        source: &[Vec<String>],
        target_prefix: &[Vec<String>],
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> std::result::Result<Vec<TranslationResult>, BoxedError>;

    /// Name used in logs
    fn engine_name(&self) -> &str;
}

impl<T> TranslationEngine for Arc<T>
where
    T: TranslationEngine + ?Sized,
{
    fn translate_batch(
        &self,
        source: &[Vec<String>],
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> std::result::Result<Vec<TranslationResult>, BoxedError> {
        (**self).translate_batch(source, options, max_batch_size, batch_type)
    }

    fn translate_batch_with_target_prefix(
        &self,
        source: &[Vec<String>],
        target_prefix: &[Vec<String>],
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> std::result::Result<Vec<TranslationResult>, BoxedError> {
        (**self).translate_batch_with_target_prefix(
            source,
            target_prefix,
            options,
            max_batch_size,
            batch_type,
        )
    }

    fn engine_name(&self) -> &str {
        (**self).engine_name()
    }
}

/// Builds an engine for a resolved configuration
pub trait EngineLoader {
    /// Load one engine instance
    ///
    /// Errors are reported as-is; the caller wraps them into
    /// [`Error::ModelLoad`](crate::Error::ModelLoad).
    fn load(
        &self,
        config: &EngineConfig,
    ) -> std::result::Result<Box<dyn TranslationEngine>, BoxedError>;
}

impl<F> EngineLoader for F
where
    F: Fn(&EngineConfig) -> std::result::Result<Box<dyn TranslationEngine>, BoxedError>,
{
    fn load(
        &self,
        config: &EngineConfig,
    ) -> std::result::Result<Box<dyn TranslationEngine>, BoxedError> {
        self(config)
    }
}

/// Wrap each target token into its own one-token prefix
pub(crate) fn single_token_prefixes(target: &[String]) -> Vec<Vec<String>> {
    target.iter().map(|token| vec![token.clone()]).collect()
}

/// Pull the best hypothesis out of every result, keeping order
pub(crate) fn extract_outputs(
    results: Vec<TranslationResult>,
    expected: usize,
) -> Result<Vec<Vec<String>>> {
    if results.len() != expected {
        return Err(Error::ResultCountMismatch {
            expected,
            got: results.len(),
        });
    }

    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| result.into_output().ok_or(Error::MissingOutput { index }))
        .collect()
}
