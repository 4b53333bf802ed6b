//! Threads → corpus → counts → weights → the cloud document handed to a renderer.

use crate::comments::flatten_forest;
use crate::config::{CloudOptions, RenderSettings};
use crate::error::CloudError;
use crate::listing::Thread;
use crate::reweight::{reweight, Weights};
use crate::tokenize::{Tokenizer, WordCounts};
use crate::util::write_atomic;
use crate::wordlist::ReferenceWordlist;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CloudWord {
    pub word: String,
    pub weight: f64, // normalised, largest word is 1.0
    pub count: u64,  // raw occurrences in the corpus
}

/// Words sorted by descending weight, at most `max_words` of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordCloud {
    pub comments: usize,
    pub total_words: u64,
    pub words: Vec<CloudWord>,
    pub settings: RenderSettings,
}

/// Every comment body of every thread, pre-order, URLs stripped.
pub fn corpus_of(threads: &[Thread]) -> Vec<String> {
    threads.iter().flat_map(|t| flatten_forest(&t.comments)).collect()
}

impl WordCloud {
    pub fn from_threads(threads: &[Thread], opts: &CloudOptions, reference: Option<&ReferenceWordlist>) -> Result<Self> {
        let corpus = corpus_of(threads);
        Self::from_corpus(corpus.as_slice(), opts, reference)
    }

    pub fn from_corpus<S: AsRef<str>>(corpus: &[S], opts: &CloudOptions, reference: Option<&ReferenceWordlist>) -> Result<Self> {
        let tokenizer = Tokenizer::for_languages(opts.languages.as_slice()).fold_plurals(opts.fold_plurals);
        let counts = tokenizer.count(corpus);
        if counts.is_empty() {
            tracing::warn!("No words left after cleanup ({} comments)", corpus.len());
        }
        let mut cloud = Self::from_counts(&counts, opts, reference)?;
        cloud.comments = corpus.len();
        Ok(cloud)
    }

    /// Weight `counts` (raw, or reweighted when configured), keep the top
    /// `max_words` and normalise against the heaviest word.
    pub fn from_counts(counts: &WordCounts, opts: &CloudOptions, reference: Option<&ReferenceWordlist>) -> Result<Self> {
        opts.validate()?;
        let weights: Weights = match (&opts.reweight, reference) {
            (Some(rw), Some(list)) => reweight(counts, list.counts(), rw.min_relative_freq, rw.boost, rw.blow)?,
            (Some(rw), None) => {
                return Err(CloudError::InvalidConfig(format!(
                    "reweighting needs the reference wordlist {}",
                    rw.wordlist.display()
                ))
                .into())
            }
            (None, _) => counts.iter().map(|(w, &c)| (w.clone(), c as f64)).collect(),
        };

        let mut ranked: Vec<(String, f64)> = weights.into_iter().filter(|(_, w)| w.is_finite() && *w > 0.0).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(opts.max_words);

        let max = ranked.first().map_or(1.0, |(_, w)| *w);
        let words = ranked
            .into_iter()
            .map(|(word, w)| {
                let count = counts.get(&word).copied().unwrap_or(0);
                CloudWord { word, weight: w / max, count }
            })
            .collect();

        Ok(Self { comments: 0, total_words: counts.values().sum(), words, settings: opts.render.clone() })
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serialize word cloud")?;
        write_atomic(path, text.as_bytes()).with_context(|| format!("write word cloud {}", path.display()))?;
        tracing::info!("Wrote {} words to {}", self.words.len(), path.display());
        Ok(())
    }

    /// Top `n` words as an aligned text table.
    pub fn summary(&self, n: usize) -> String {
        let shown = &self.words[..n.min(self.words.len())];
        let width = shown.iter().map(|w| w.word.chars().count()).max().unwrap_or(4).max(4);
        let mut out = String::new();
        let _ = writeln!(out, "{:>4}  {:<width$}  {:>6}  {:>7}", "#", "word", "weight", "count");
        for (i, w) in shown.iter().enumerate() {
            let _ = writeln!(out, "{:>4}  {:<width$}  {:>6.3}  {:>7}", i + 1, w.word, w.weight, w.count);
        }
        out
    }
}
