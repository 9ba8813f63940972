//! CTranslate2 backend
//!
//! Drives the native CTranslate2 translator through `ct2rs`. Only compiled
//! with the `ctranslate2` feature, since it builds and links the C++
//! library.

use ct2rs::sys;
use tracing::debug;

use crate::engine::{
    BatchType, ComputeType, Device, EngineConfig, EngineLoader, TranslationEngine,
    TranslationResult,
};
use crate::error::BoxedError;
use crate::options::TranslationOptions;

/// Loader producing [`Ct2Engine`] instances
#[derive(Debug, Clone, Copy, Default)]
pub struct Ct2Loader;

impl EngineLoader for Ct2Loader {
    fn load(&self, config: &EngineConfig) -> Result<Box<dyn TranslationEngine>, BoxedError> {
        Ok(Box::new(Ct2Engine::load(config)?))
    }
}

/// One native CTranslate2 translator
pub struct Ct2Engine {
    inner: sys::Translator,
}

impl Ct2Engine {
    pub fn load(config: &EngineConfig) -> Result<Self, BoxedError> {
        debug!(
            "Creating CTranslate2 translator on {:?} {:?}",
            config.device, config.device_indices
        );
        let inner = sys::Translator::new(&config.model_path, &native_config(config))?;
        Ok(Self { inner })
    }
}

fn native_config(config: &EngineConfig) -> ct2rs::Config {
    ct2rs::Config {
        device: match config.device {
            Device::Cpu => ct2rs::Device::CPU,
            Device::Cuda => ct2rs::Device::CUDA,
        },
        compute_type: match config.compute_type {
            ComputeType::Default => ct2rs::ComputeType::DEFAULT,
            ComputeType::Int8 => ct2rs::ComputeType::INT8,
            ComputeType::Float16 => ct2rs::ComputeType::FLOAT16,
        },
        device_indices: config.device_indices.clone(),
        ..Default::default()
    }
}

fn native_options(
    options: &TranslationOptions,
    max_batch_size: usize,
    batch_type: BatchType,
) -> ct2rs::TranslationOptions<String, String> {
    ct2rs::TranslationOptions {
        beam_size: options.beam_size(),
        patience: options.patience(),
        length_penalty: options.length_penalty(),
        coverage_penalty: options.coverage_penalty(),
        repetition_penalty: options.repetition_penalty(),
        no_repeat_ngram_size: options.no_repeat_ngram_size(),
        disable_unk: options.disable_unk(),
        prefix_bias_beta: options.prefix_bias_beta(),
        return_end_token: options.return_end_token(),
        max_input_length: options.max_input_length(),
        max_decoding_length: options.max_decoding_length(),
        min_decoding_length: options.min_decoding_length(),
        sampling_topk: options.sampling_topk(),
        sampling_temperature: options.sampling_temperature(),
        use_vmap: options.use_vmap(),
        num_hypotheses: options.num_hypotheses(),
        return_scores: options.return_scores(),
        return_attention: options.return_attention(),
        return_alternatives: options.return_alternatives(),
        min_alternative_expansion_prob: options.min_alternative_expansion_prob(),
        replace_unknowns: options.replace_unknowns(),
        max_batch_size,
        batch_type: match batch_type {
            BatchType::Examples => ct2rs::BatchType::Examples,
            BatchType::Tokens => ct2rs::BatchType::Tokens,
        },
        ..Default::default()
    }
}

fn convert(results: Vec<sys::TranslationResult>) -> Vec<TranslationResult> {
    results
        .into_iter()
        .map(|r| TranslationResult {
            hypotheses: r.hypotheses,
            scores: r.scores,
        })
        .collect()
}

impl TranslationEngine for Ct2Engine {
    fn translate_batch(
        &self,
        source: &[Vec<String>],
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> Result<Vec<TranslationResult>, BoxedError> {
        let options = native_options(options, max_batch_size, batch_type);
        let results = self.inner.translate_batch(source, &options, None)?;
        Ok(convert(results))
    }

    fn translate_batch_with_target_prefix(
        &self,
        source: &[Vec<String>],
        target_prefix: &[Vec<String>],
        options: &TranslationOptions,
        max_batch_size: usize,
        batch_type: BatchType,
    ) -> Result<Vec<TranslationResult>, BoxedError> {
        let options = native_options(options, max_batch_size, batch_type);
        let results =
            self.inner
                .translate_batch_with_target_prefix(source, target_prefix, &options, None)?;
        Ok(convert(results))
    }

    fn engine_name(&self) -> &str {
        "CTranslate2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::batch::BatchData;
    use crate::translator::Translator;

    #[test]
    fn test_native_options_carries_every_field() {
        let options = TranslationOptions::builder()
            .with_beam_size(5)
            .with_patience(1.5)
            .with_length_penalty(0.8)
            .with_coverage_penalty(0.2)
            .with_repetition_penalty(1.3)
            .with_no_repeat_ngram_size(3)
            .with_disable_unk(true)
            .with_prefix_bias_beta(0.4)
            .with_return_end_token(true)
            .with_use_vmap(true)
            .with_num_hypotheses(2)
            .with_return_scores(true)
            .with_return_attention(true)
            .with_return_alternatives(true)
            .with_min_alternative_expansion_prob(0.05)
            .with_replace_unknowns(true)
            .with_max_input_length(512)
            .with_max_decoding_length(128)
            .with_min_decoding_length(4)
            .with_sampling_topk(10)
            .with_sampling_temperature(0.7)
            .build();

        let native = native_options(&options, 48, BatchType::Tokens);

        assert_eq!(native.beam_size, 5);
        assert_eq!(native.patience, 1.5);
        assert_eq!(native.length_penalty, 0.8);
        assert_eq!(native.coverage_penalty, 0.2);
        assert_eq!(native.repetition_penalty, 1.3);
        assert_eq!(native.no_repeat_ngram_size, 3);
        assert!(native.disable_unk);
        assert_eq!(native.prefix_bias_beta, 0.4);
        assert!(native.return_end_token);
        assert!(native.use_vmap);
        assert_eq!(native.num_hypotheses, 2);
        assert!(native.return_scores);
        assert!(native.return_attention);
        assert!(native.return_alternatives);
        assert_eq!(native.min_alternative_expansion_prob, 0.05);
        assert!(native.replace_unknowns);
        assert_eq!(native.max_input_length, 512);
        assert_eq!(native.max_decoding_length, 128);
        assert_eq!(native.min_decoding_length, 4);
        assert_eq!(native.sampling_topk, 10);
        assert_eq!(native.sampling_temperature, 0.7);
        assert_eq!(native.max_batch_size, 48);
        assert!(matches!(native.batch_type, ct2rs::BatchType::Tokens));
    }

    #[test]
    fn test_native_options_examples_batching() {
        let native = native_options(&TranslationOptions::default(), 0, BatchType::Examples);
        assert_eq!(native.max_batch_size, 0);
        assert!(matches!(native.batch_type, ct2rs::BatchType::Examples));
        assert_eq!(native.beam_size, 2);
        assert_eq!(native.max_decoding_length, 256);
    }

    #[test]
    fn test_native_config_device_and_precision() {
        let model = Path::new("models/ende");

        let gpu_fast = native_config(&EngineConfig::resolve(model, true, true));
        assert!(matches!(gpu_fast.device, ct2rs::Device::CUDA));
        assert!(matches!(gpu_fast.compute_type, ct2rs::ComputeType::FLOAT16));
        assert_eq!(gpu_fast.device_indices, vec![0]);

        let cpu_fast = native_config(&EngineConfig::resolve(model, false, true));
        assert!(matches!(cpu_fast.device, ct2rs::Device::CPU));
        assert!(matches!(cpu_fast.compute_type, ct2rs::ComputeType::INT8));

        let cpu = native_config(&EngineConfig::resolve(model, false, false));
        assert!(matches!(cpu.device, ct2rs::Device::CPU));
        assert!(matches!(cpu.compute_type, ct2rs::ComputeType::DEFAULT));
    }

    /// Needs a converted model, e.g. `CT2_TEST_MODEL=models/ende_ctranslate2`
    #[test]
    #[ignore]
    fn test_translate_with_real_model() {
        let model = std::env::var("CT2_TEST_MODEL").expect("CT2_TEST_MODEL not set");
        let translator = Translator::from_loader(&Ct2Loader, &model, false, false).unwrap();
        assert_eq!(translator.engine_name(), "CTranslate2");

        let mut data = BatchData::new();
        data.append(
            ["▁H", "ell", "o", "▁world", "!"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        );

        let result = translator
            .translate_batch_default(&data, 0, BatchType::Examples)
            .unwrap();
        assert_eq!(result.len(), 1);
        assert!(!result.get(0).unwrap().is_empty());
    }
}
