use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// USD per one million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub prompt_per_million: f64,
    pub completion_per_million: f64,
}

impl ModelPricing {
    pub const GPT_35_TURBO: ModelPricing =
        ModelPricing { prompt_per_million: 0.50, completion_per_million: 1.50 };

    /// Cost of one completion, rounded to 6 decimal places.
    pub fn cost_usd(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        let prompt = prompt_tokens as f64 / 1_000_000.0 * self.prompt_per_million;
        let completion = completion_tokens as f64 / 1_000_000.0 * self.completion_per_million;
        round_to_micros(prompt + completion)
    }
}

fn round_to_micros(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Per-model rates, keyed by exact model name or model-family prefix.
///
/// Example TOML:
/// [openai.pricing."gpt-3.5-turbo"]
/// prompt_per_million = 0.5
/// completion_per_million = 1.5
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingTable {
    models: BTreeMap<String, ModelPricing>,
}

impl Default for PricingTable {
    fn default() -> Self {
        let mut models = BTreeMap::new();
        models.insert(DEFAULT_MODEL.to_string(), ModelPricing::GPT_35_TURBO);
        Self { models }
    }
}

impl PricingTable {
    pub fn empty() -> Self {
        Self { models: BTreeMap::new() }
    }

    pub fn set(&mut self, model: impl Into<String>, pricing: ModelPricing) {
        self.models.insert(model.into(), pricing);
    }

    /// Rates for `model`: exact match first, then the longest configured prefix.
    pub fn lookup(&self, model: &str) -> Option<ModelPricing> {
        if let Some(pricing) = self.models.get(model) {
            return Some(*pricing);
        }

        self.models
            .iter()
            .filter(|(key, _)| model.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, pricing)| *pricing)
    }

    /// Like [`lookup`](Self::lookup), falling back to the `gpt-3.5-turbo` rates.
    pub fn pricing_for(&self, model: &str) -> ModelPricing {
        self.lookup(model).unwrap_or_else(|| {
            tracing::warn!(model, "no pricing configured for model, using {DEFAULT_MODEL} rates");
            ModelPricing::GPT_35_TURBO
        })
    }
}
