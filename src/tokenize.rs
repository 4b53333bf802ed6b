//! Corpus → word frequency mapping.

use crate::stopwords::{build_stopwords, StopWords};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Word → number of occurrences across the corpus.
pub type WordCounts = HashMap<String, u64, ahash::RandomState>;

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w[\w']+").unwrap())
}

#[derive(Clone, Debug)]
pub struct Tokenizer {
    stopwords: StopWords,
    fold_plurals: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(build_stopwords::<&str>(&[]))
    }
}

impl Tokenizer {
    pub fn new(stopwords: StopWords) -> Self {
        Self { stopwords, fold_plurals: true }
    }

    /// English stopwords plus the given languages.
    pub fn for_languages<S: AsRef<str>>(languages: &[S]) -> Self {
        Self::new(build_stopwords(languages))
    }

    pub fn fold_plurals(mut self, yes: bool) -> Self {
        self.fold_plurals = yes;
        self
    }

    /// Lowercased tokens of `text` that survive stopword and number filtering.
    pub fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        word_regex().find_iter(text).filter_map(move |m| self.normalize(m.as_str()))
    }

    fn normalize(&self, raw: &str) -> Option<String> {
        let lower = raw.to_lowercase();
        if self.stopwords.contains(&lower) {
            return None;
        }
        let word = lower.strip_suffix("'s").unwrap_or(&lower).trim_end_matches('\'');
        if word.is_empty() || word.chars().all(|c| c.is_ascii_digit()) || self.stopwords.contains(word) {
            return None;
        }
        Some(word.to_string())
    }

    /// Count tokens across every string of the corpus.
    pub fn count<S: AsRef<str>>(&self, corpus: &[S]) -> WordCounts {
        let mut counts = WordCounts::default();
        for text in corpus {
            for tok in self.tokens(text.as_ref()) {
                *counts.entry(tok).or_insert(0) += 1;
            }
        }
        if self.fold_plurals {
            fold_plurals(&mut counts);
        }
        counts
    }
}

/// Merge `words` into `word` when both occur. Words ending in `ss` are left alone.
fn fold_plurals(counts: &mut WordCounts) {
    let plurals: Vec<String> = counts
        .keys()
        .filter(|w| w.ends_with('s') && !w.ends_with("ss") && w.len() > 1)
        .filter(|w| counts.contains_key(&w[..w.len() - 1]))
        .cloned()
        .collect();
    for plural in plurals {
        if let Some(n) = counts.remove(&plural) {
            *counts.entry(plural[..plural.len() - 1].to_string()).or_insert(0) += n;
        }
    }
}
