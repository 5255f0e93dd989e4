//! Name normalization applied before any distance measurement.

use regex::Regex;

use crate::config::NormalizerConfig;
use crate::error::{Error, Result};

/// Cleans and standardizes a raw item name for comparison.
///
/// Applied in order: lower-case, synonym folding, noise-phrase deletion,
/// trailing color/finish clause strip, comma-to-space and whitespace
/// collapse. Normalization never fails; an empty input yields an empty
/// output.
#[derive(Debug, Clone)]
pub struct Normalizer {
    synonyms: Vec<(Regex, String)>,
    noise: Vec<Regex>,
}

impl Normalizer {
    /// Compile a normalizer from configuration.
    ///
    /// Longer phrases are matched first so that a multi-word synonym wins
    /// over a shorter one contained in it.
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        let mut phrases: Vec<(String, String)> = Vec::new();
        for (canonical, alternatives) in &config.synonyms {
            for phrase in alternatives {
                phrases.push((phrase.to_lowercase(), canonical.to_lowercase()));
            }
        }
        phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let synonyms = phrases
            .into_iter()
            .map(|(phrase, canonical)| Ok((word_bounded(&phrase)?, canonical)))
            .collect::<Result<Vec<_>>>()?;

        let mut noise_phrases: Vec<String> =
            config.noise_phrases.iter().map(|p| p.to_lowercase()).collect();
        noise_phrases.sort_by(|a, b| b.len().cmp(&a.len()));
        let noise = noise_phrases
            .iter()
            .map(|p| word_bounded(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { synonyms, noise })
    }

    /// Normalize one raw name.
    pub fn normalize(&self, raw: &str) -> String {
        let mut name = raw.to_lowercase();
        for (pattern, canonical) in &self.synonyms {
            // NoExpand: canonical tokens are literals, not templates.
            name = pattern
                .replace_all(&name, regex::NoExpand(canonical.as_str()))
                .into_owned();
        }
        for pattern in &self.noise {
            name = pattern.replace_all(&name, "").into_owned();
        }
        let name = strip_trailing_finish(&name);
        collapse_whitespace(&name.replace(',', " "))
    }
}

fn word_bounded(phrase: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
        .map_err(|e| Error::Config(e.to_string()))
}

/// Remove the clause after the last comma when it looks like a pure
/// color/finish qualifier: at most three words, none mixing letters and
/// digits. Tokens like "128gb" or "5g" keep the clause intact.
fn strip_trailing_finish(name: &str) -> String {
    let Some(pos) = name.rfind(',') else {
        return name.to_string();
    };
    let tail: Vec<&str> = name[pos + 1..].split_whitespace().collect();
    if tail.len() <= 3 && !tail.iter().any(|t| mixes_letters_digits(t)) {
        name[..pos].to_string()
    } else {
        name.to_string()
    }
}

fn collapse_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a token contains both a letter and a digit ("5g", "128gb").
///
/// Used as the proxy for "this name encodes a model variant".
pub(crate) fn mixes_letters_digits(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit()) && token.chars().any(char::is_alphabetic)
}
