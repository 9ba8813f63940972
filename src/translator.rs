//! Batch translation over one loaded model
//!
//! A [`Translator`] owns exactly one engine instance. Each call exports the
//! input batch, hands it to the engine and copies the primary hypothesis of
//! every result into a fresh [`BatchData`], preserving input order.
//!
//! # Example
//!
//! ```ignore
//! use rusty_ctranslate2::{BatchData, BatchType, TranslationOptions, Translator};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let translator = Translator::new("models/ende_ctranslate2", false, true)?;
//!
//!     let mut data = BatchData::new();
//!     data.append(vec!["▁H".into(), "ello".into(), "▁world".into(), "!".into()]);
//!
//!     let options = TranslationOptions::builder().with_beam_size(4).build();
//!     let result = translator.translate_batch(&data, &options, 0, BatchType::Examples)?;
//!     println!("{:?}", result.get(0)?);
//!     Ok(())
//! }
//! ```

use std::path::Path;

use tracing::{debug, info};

use crate::batch::BatchData;
use crate::engine::{
    BatchType, EngineConfig, EngineLoader, TranslationEngine, TranslationResult, extract_outputs,
    single_token_prefixes,
};
use crate::error::{Error, Result};
use crate::options::TranslationOptions;

/// Handle around one loaded model
///
/// Configuration is fixed at construction. Calls take `&self`; concurrent
/// calls go straight to the engine, which is required to be `Sync`.
pub struct Translator {
    engine: Box<dyn TranslationEngine>,
    config: Option<EngineConfig>,
}

impl Translator {
    /// Load a CTranslate2 model
    ///
    /// Device and precision follow [`EngineConfig::resolve`]. A model that
    /// cannot be loaded yields [`Error::ModelLoad`]; no other device or
    /// precision is tried.
    #[cfg(feature = "ctranslate2")]
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool, fast: bool) -> Result<Self> {
        Self::from_loader(&crate::ctranslate2::Ct2Loader, model_path, use_gpu, fast)
    }

    /// Load a model through the given loader
    pub fn from_loader<L, P>(loader: &L, model_path: P, use_gpu: bool, fast: bool) -> Result<Self>
    where
        L: EngineLoader + ?Sized,
        P: AsRef<Path>,
    {
        let model_path = model_path.as_ref();
        let config = EngineConfig::resolve(model_path, use_gpu, fast);

        debug!(
            "Loading model from {} (device: {:?}, compute type: {:?})",
            model_path.display(),
            config.device,
            config.compute_type
        );

        let engine = loader.load(&config).map_err(|source| Error::ModelLoad {
            path: model_path.to_path_buf(),
            source,
        })?;

        info!(
            "Loaded model {} with {}",
            model_path.display(),
            engine.engine_name()
        );

        Ok(Self {
            engine,
            config: Some(config),
        })
    }

    /// Wrap an engine that was built elsewhere
    pub fn with_engine<E>(engine: E) -> Self
    where
        E: TranslationEngine + 'static,
    {
        Self {
            engine: Box::new(engine),
            config: None,
        }
    }

    /// Resolved configuration, when the model was loaded by this handle
    pub fn config(&self) -> Option<&EngineConfig> {
        self.config.as_ref()
    }

    pub fn engine_name(&self) -> &str {
        self.engine.engine_name()
    }

    /// Translate every sentence of `data`
    ///
    /// `max_batch_size == 0` leaves sub-batching to the engine. Result `i`
    /// is the translation of input `i`. An empty batch returns an empty
    /// batch without reaching the engine.
    pub fn translate_batch(
        &self,
        data: &BatchData,
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> Result<BatchData> {
        let source = data.export_all();
        if source.is_empty() {
            return Ok(BatchData::new());
        }

        debug!(
            "Translating {} sentences (max_batch_size: {}, batch_type: {})",
            source.len(),
            max_batch_size,
            batch_type
        );

        let results = self
            .engine
            .translate_batch(&source, options, max_batch_size, batch_type)
            .map_err(Error::engine)?;

        Self::collect(results, source.len())
    }

    /// [`translate_batch`](Self::translate_batch) with default options
    pub fn translate_batch_default(
        &self,
        data: &BatchData,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> Result<BatchData> {
        self.translate_batch(
            data,
            &TranslationOptions::default(),
            max_batch_size,
            batch_type,
        )
    }

    /// Translate with one target prefix token per sentence
    ///
    /// `target[i]` becomes the single-token prefix the engine must start
    /// sentence `i` with.
    ///
    /// # Errors
    ///
    /// [`Error::TargetLengthMismatch`] when `target` and `data` differ in
    /// length; the engine is not called in that case.
    pub fn translate_batch_target(
        &self,
        data: &BatchData,
        target: &[String],
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> Result<BatchData> {
        if target.len() != data.len() {
            return Err(Error::TargetLengthMismatch {
                data: data.len(),
                target: target.len(),
            });
        }

        let source = data.export_all();
        if source.is_empty() {
            return Ok(BatchData::new());
        }

        let target_prefix = single_token_prefixes(target);

        debug!(
            "Translating {} sentences with target prefix (max_batch_size: {}, batch_type: {})",
            source.len(),
            max_batch_size,
            batch_type
        );

        let results = self
            .engine
            .translate_batch_with_target_prefix(
                &source,
                &target_prefix,
                options,
                max_batch_size,
                batch_type,
            )
            .map_err(Error::engine)?;

        Self::collect(results, source.len())
    }

    /// Translate plain nested token vectors with default options
    ///
    /// `None` for `max_batch_size` lets the engine choose.
    pub fn translate_tokens(
        &self,
        input: Vec<Vec<String>>,
        max_batch_size: Option<usize>,
        batch_type: BatchType,
    ) -> Result<Vec<Vec<String>>> {
        let data = BatchData::from(input);
        self.translate_batch_default(&data, max_batch_size.unwrap_or(0), batch_type)
            .map(BatchData::into_sentences)
    }

    fn collect(results: Vec<TranslationResult>, expected: usize) -> Result<BatchData> {
        let outputs = extract_outputs(results, expected)?;
        debug!("Engine returned {} translations", outputs.len());

        let mut batch = BatchData::with_capacity(outputs.len());
        for sentence in outputs {
            batch.append(sentence);
        }
        Ok(batch)
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("engine", &self.engine.engine_name())
            .field("config", &self.config)
            .finish()
    }
}

impl Drop for Translator {
    fn drop(&mut self) {
        debug!("Releasing {}", self.engine.engine_name());
    }
}
