//! Configuration inputs supplied by the surrounding service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name-normalization configuration: synonym folding and noise phrases.
///
/// `synonyms` maps a canonical token to the phrases that should fold into it
/// (matched case-insensitively on whole-word boundaries). `noise_phrases` are
/// boilerplate qualifiers deleted outright before comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Canonical token -> equivalent phrases.
    #[serde(default)]
    pub synonyms: BTreeMap<String, Vec<String>>,
    /// Phrases that carry no comparison value.
    #[serde(default)]
    pub noise_phrases: Vec<String>,
}

impl NormalizerConfig {
    /// Add one synonym group.
    pub fn synonym(mut self, canonical: impl Into<String>, phrases: &[&str]) -> Self {
        self.synonyms
            .entry(canonical.into())
            .or_default()
            .extend(phrases.iter().map(|p| (*p).to_string()));
        self
    }

    /// Add one noise phrase.
    pub fn noise_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.noise_phrases.push(phrase.into());
        self
    }
}

/// Category id in the sibling-map JSON; the upstream export stores ids as
/// either bare numbers or numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawCategoryId {
    Num(i64),
    Text(String),
}

impl RawCategoryId {
    fn value(&self) -> Option<i64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawCategoryEntry {
    seap_cpv_id: RawCategoryId,
}

/// Sibling lookup over category codes, loaded once per process.
///
/// Built from the upstream category-mapping export: a JSON object of
/// `category name -> [{ "seap_cpv_id": ... }, ...]`. Two codes are siblings
/// when they appear under the same category name.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    groups: Vec<Vec<i64>>,
}

impl CategoryMap {
    /// Parse the sibling map from its JSON export.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<RawCategoryEntry>> =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        let groups = raw
            .into_values()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| e.seap_cpv_id.value())
                    .collect()
            })
            .collect();
        Ok(Self { groups })
    }

    /// Build directly from id groups.
    pub fn from_groups(groups: Vec<Vec<i64>>) -> Self {
        Self { groups }
    }

    /// All category ids sharing a group with `category_id`, including itself.
    ///
    /// Unknown ids yield an empty slice.
    pub fn siblings(&self, category_id: i64) -> &[i64] {
        self.groups
            .iter()
            .find(|g| g.contains(&category_id))
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_map_parses_upstream_shape() {
        let json = r#"{
            "Laptops": [{"seap_cpv_id": "12468"}, {"seap_cpv_id": 12469}],
            "Phones": [{"seap_cpv_id": "32250"}]
        }"#;
        let map = CategoryMap::from_json(json).unwrap();
        assert_eq!(map.siblings(12468), &[12468, 12469]);
        assert_eq!(map.siblings(12469), &[12468, 12469]);
        assert_eq!(map.siblings(32250), &[32250]);
        assert!(map.siblings(99999).is_empty());
    }

    #[test]
    fn category_map_rejects_bad_json() {
        assert!(CategoryMap::from_json("not json").is_err());
    }

    #[test]
    fn config_builders_accumulate() {
        let cfg = NormalizerConfig::default()
            .synonym("laptop", &["notebook", "portable computer"])
            .noise_phrase("new in box");
        assert_eq!(cfg.synonyms["laptop"].len(), 2);
        assert_eq!(cfg.noise_phrases, vec!["new in box"]);
    }
}
