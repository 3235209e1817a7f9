//! Dataset variant manifest
//!
//! Every variant shares the same target columns; only the feature subset
//! differs.

use serde::{Deserialize, Serialize};

/// Named feature subset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    pub name: String,
    pub features: Vec<String>,
}

impl VariantSpec {
    pub fn new(name: impl Into<String>, features: Vec<String>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }
}

/// Ordered list of variants to emit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantManifest {
    variants: Vec<VariantSpec>,
}

impl VariantManifest {
    pub fn new(variants: Vec<VariantSpec>) -> Self {
        Self { variants }
    }

    /// `dataset` (base + all sentiment), `dataset_base` (base only), and
    /// `dataset_<source>` (base + that one source) per sentiment column.
    pub fn standard(base_columns: &[String], sentiment_columns: &[String]) -> Self {
        let mut variants = Vec::with_capacity(sentiment_columns.len() + 2);

        let mut complete = base_columns.to_vec();
        complete.extend(sentiment_columns.iter().cloned());
        variants.push(VariantSpec::new("dataset", complete));
        variants.push(VariantSpec::new("dataset_base", base_columns.to_vec()));

        for source in sentiment_columns {
            let mut features = base_columns.to_vec();
            features.push(source.clone());
            variants.push(VariantSpec::new(
                format!("dataset_{}", source.to_lowercase()),
                features,
            ));
        }

        Self { variants }
    }

    pub fn variants(&self) -> &[VariantSpec] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_standard_manifest() {
        let base = strings(&["Close_t-2", "Interest Rate_Old"]);
        let sentiment = strings(&["FinBERT_Sentences", "RoBERTa_Chunks"]);
        let manifest = VariantManifest::standard(&base, &sentiment);

        let names: Vec<&str> = manifest.variants().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["dataset", "dataset_base", "dataset_finbert_sentences", "dataset_roberta_chunks"]
        );

        assert_eq!(
            manifest.variants()[0].features,
            strings(&["Close_t-2", "Interest Rate_Old", "FinBERT_Sentences", "RoBERTa_Chunks"])
        );
        assert_eq!(manifest.variants()[1].features, base);
        assert_eq!(
            manifest.variants()[3].features,
            strings(&["Close_t-2", "Interest Rate_Old", "RoBERTa_Chunks"])
        );
    }

    #[test]
    fn test_standard_manifest_without_sentiment() {
        let manifest = VariantManifest::standard(&strings(&["a"]), &[]);
        assert_eq!(manifest.len(), 2);
    }
}
