//! Decoding options for a translation call
//!
//! [`TranslationOptions`] bundles every decoding parameter into one value so
//! call sites never repeat a long positional argument list. It is built once,
//! through [`TranslationOptionsBuilder`] or from a JSON file, and then only
//! read. Validation is left to the engine.
//!
//! # Example
//!
//! ```
//! use rusty_ctranslate2::TranslationOptions;
//!
//! let options = TranslationOptions::builder()
//!     .with_beam_size(4)
//!     .with_return_scores(true)
//!     .build();
//! assert_eq!(options.beam_size(), 4);
//! assert_eq!(options.max_decoding_length(), 256);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Immutable decoding configuration
///
/// Fields are only reachable through getters. `Default` yields the same
/// values as `TranslationOptions::builder().build()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslationOptions {
    beam_size: usize,
    patience: f32,
    length_penalty: f32,
    coverage_penalty: f32,
    repetition_penalty: f32,
    no_repeat_ngram_size: usize,
    disable_unk: bool,
    prefix_bias_beta: f32,
    return_end_token: bool,
    use_vmap: bool,
    num_hypotheses: usize,
    return_scores: bool,
    return_attention: bool,
    return_alternatives: bool,
    min_alternative_expansion_prob: f32,
    replace_unknowns: bool,
    max_input_length: usize,
    max_decoding_length: usize,
    min_decoding_length: usize,
    sampling_topk: usize,
    sampling_temperature: f32,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            beam_size: 2,
            patience: 1.0,
            length_penalty: 1.0,
            coverage_penalty: 0.0,
            repetition_penalty: 1.0,
            no_repeat_ngram_size: 0,
            disable_unk: false,
            prefix_bias_beta: 0.0,
            return_end_token: false,
            use_vmap: false,
            num_hypotheses: 1,
            return_scores: false,
            return_attention: false,
            return_alternatives: false,
            min_alternative_expansion_prob: 0.0,
            replace_unknowns: false,
            max_input_length: 1024,
            max_decoding_length: 256,
            min_decoding_length: 1,
            sampling_topk: 1,
            sampling_temperature: 1.0,
        }
    }
}

macro_rules! getters {
    ($($(#[$doc:meta])* $field:ident: $ty:ty),* $(,)?) => {
        impl TranslationOptions {
            $(
                $(#[$doc])*
                pub fn $field(&self) -> $ty {
                    self.$field
                }
            )*
        }
    };
}

getters! {
    /// Beam width (1 means greedy or sampling)
    beam_size: usize,
    patience: f32,
    length_penalty: f32,
    coverage_penalty: f32,
    repetition_penalty: f32,
    /// Forbid repeating n-grams of this size (0 disables)
    no_repeat_ngram_size: usize,
    /// Never produce the unknown token
    disable_unk: bool,
    /// Bias towards the target prefix, 0 disables biased decoding
    prefix_bias_beta: f32,
    return_end_token: bool,
    use_vmap: bool,
    num_hypotheses: usize,
    return_scores: bool,
    return_attention: bool,
    return_alternatives: bool,
    min_alternative_expansion_prob: f32,
    replace_unknowns: bool,
    /// Inputs are truncated to this many tokens (0 disables)
    max_input_length: usize,
    max_decoding_length: usize,
    min_decoding_length: usize,
    /// Sample from the k most likely tokens (1 means argmax)
    sampling_topk: usize,
    sampling_temperature: f32,
}

impl TranslationOptions {
    /// Start from the default options
    pub fn builder() -> TranslationOptionsBuilder {
        TranslationOptionsBuilder::default()
    }

    /// Parse options from a JSON object
    ///
    /// Fields not present keep their default value; unknown fields are
    /// rejected so typos do not silently fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file
    ///
    /// ```json
    /// { "beam_size": 4, "return_scores": true }
    /// ```
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::OptionsFile {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        serde_json::from_str(&content).map_err(|e| Error::OptionsFile {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

/// Builder for [`TranslationOptions`], starting at the documented defaults
#[derive(Debug, Clone, Default)]
pub struct TranslationOptionsBuilder {
    options: TranslationOptions,
}

macro_rules! setters {
    ($($setter:ident => $field:ident: $ty:ty),* $(,)?) => {
        impl TranslationOptionsBuilder {
            $(
                pub fn $setter(mut self, value: $ty) -> Self {
                    self.options.$field = value;
                    self
                }
            )*
        }
    };
}

setters! {
    with_beam_size => beam_size: usize,
    with_patience => patience: f32,
    with_length_penalty => length_penalty: f32,
    with_coverage_penalty => coverage_penalty: f32,
    with_repetition_penalty => repetition_penalty: f32,
    with_no_repeat_ngram_size => no_repeat_ngram_size: usize,
    with_disable_unk => disable_unk: bool,
    with_prefix_bias_beta => prefix_bias_beta: f32,
    with_return_end_token => return_end_token: bool,
    with_use_vmap => use_vmap: bool,
    with_num_hypotheses => num_hypotheses: usize,
    with_return_scores => return_scores: bool,
    with_return_attention => return_attention: bool,
    with_return_alternatives => return_alternatives: bool,
    with_min_alternative_expansion_prob => min_alternative_expansion_prob: f32,
    with_replace_unknowns => replace_unknowns: bool,
    with_max_input_length => max_input_length: usize,
    with_max_decoding_length => max_decoding_length: usize,
    with_min_decoding_length => min_decoding_length: usize,
    with_sampling_topk => sampling_topk: usize,
    with_sampling_temperature => sampling_temperature: f32,
}

impl TranslationOptionsBuilder {
    /// Freeze the configured values
    pub fn build(self) -> TranslationOptions {
        self.options
    }
}
