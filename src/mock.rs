//! Mock translation engine for testing
//!
//! Deterministic, model-free engine for exercising the translation pipeline
//! without CTranslate2 or model files. It also records what it was called
//! with so tests can check that batching parameters reach the engine.
//!
//! # Example
//!
//! ```
//! use rusty_ctranslate2::{BatchData, MockEngine, MockMode, TranslationOptions, Translator};
//!
//! let translator = Translator::with_engine(MockEngine::new(MockMode::Reverse));
//! let data = BatchData::from(vec![vec!["Hello".to_string(), "world".to_string()]]);
//! let result = translator
//!     .translate_batch(&data, &TranslationOptions::default(), 0, Default::default())
//!     .unwrap();
//! assert_eq!(result.get(0).unwrap(), vec!["world", "Hello"]);
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::{BatchType, EngineConfig, EngineLoader, TranslationEngine, TranslationResult};
use crate::error::BoxedError;
use crate::options::TranslationOptions;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Reverse token order: ["Hello", "world"] → ["world", "Hello"]
    Reverse,

    /// Append a marker token to every sentence: ["a"] → ["a", "<marker>"]
    Suffix(String),

    /// Return input unchanged
    Echo,

    /// Fail every call with this message
    Error(String),
}

/// Parameters of the last engine call
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub sentences: usize,
    pub max_batch_size: usize,
    pub batch_type: BatchType,
    pub options: TranslationOptions,
    pub with_target_prefix: bool,
}

/// Engine that transforms tokens according to a [`MockMode`]
///
/// With a target prefix, the prefix tokens are placed in front of the
/// transformed sentence, like a constrained decoder would emit them.
#[derive(Debug)]
pub struct MockEngine {
    mode: MockMode,
    calls: AtomicUsize,
    last_call: Mutex<Option<MockCall>>,
}

impl MockEngine {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// Number of times the engine has been invoked
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Parameters of the most recent invocation
    pub fn last_call(&self) -> Option<MockCall> {
        self.last_call
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn record(&self, call: MockCall) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.last_call.lock() {
            Ok(mut guard) => *guard = Some(call),
            Err(poisoned) => *poisoned.into_inner() = Some(call),
        }
    }

    fn apply(&self, sentence: &[String]) -> Result<Vec<String>, BoxedError> {
        match &self.mode {
            MockMode::Reverse => Ok(sentence.iter().rev().cloned().collect()),
            MockMode::Suffix(marker) => {
                let mut out = sentence.to_vec();
                out.push(marker.clone());
                Ok(out)
            }
            MockMode::Echo => Ok(sentence.to_vec()),
            MockMode::Error(msg) => Err(msg.clone().into()),
        }
    }

    fn result(&self, output: Vec<String>, options: &TranslationOptions) -> TranslationResult {
        let hypotheses = vec![output; options.num_hypotheses().max(1)];
        let scores = if options.return_scores() {
            (0..hypotheses.len()).map(|rank| -(rank as f32)).collect()
        } else {
            Vec::new()
        };
        TranslationResult { hypotheses, scores }
    }
}

impl TranslationEngine for MockEngine {
    fn translate_batch(
        &self,
        source: &[Vec<String>],
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> Result<Vec<TranslationResult>, BoxedError> {
        self.record(MockCall {
            sentences: source.len(),
            max_batch_size,
            batch_type,
            options: *options,
            with_target_prefix: false,
        });

        source
            .iter()
            .map(|sentence| -> Result<TranslationResult, BoxedError> {
                Ok(self.result(self.apply(sentence)?, options))
            })
            .collect()
    }

    fn translate_batch_with_target_prefix(
        &self,
        source: &[Vec<String>],
        target_prefix: &[Vec<String>],
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> Result<Vec<TranslationResult>, BoxedError> {
        self.record(MockCall {
            sentences: source.len(),
            max_batch_size,
            batch_type,
            options: *options,
            with_target_prefix: true,
        });

        source
            .iter()
            .zip(target_prefix)
            .map(|(sentence, prefix)| -> Result<TranslationResult, BoxedError> {
                let mut output = prefix.clone();
                output.extend(self.apply(sentence)?);
                Ok(self.result(output, options))
            })
            .collect()
    }

    fn engine_name(&self) -> &str {
        "Mock Engine"
    }
}

/// Loader that builds a [`MockEngine`] when the model path exists
///
/// A missing path fails the same way a real engine fails on a bad model
/// directory.
#[derive(Debug, Clone)]
pub struct MockLoader {
    mode: MockMode,
}

impl MockLoader {
    pub fn new(mode: MockMode) -> Self {
        Self { mode }
    }
}

impl EngineLoader for MockLoader {
    fn load(&self, config: &EngineConfig) -> Result<Box<dyn TranslationEngine>, BoxedError> {
        if !config.model_path.exists() {
            return Err(format!(
                "model path '{}' does not exist",
                config.model_path.display()
            )
            .into());
        }
        Ok(Box::new(MockEngine::new(self.mode.clone())))
    }
}
