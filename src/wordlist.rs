//! Reference wordlist: `rank;word;count` rows mapping common words to their
//! popularity in an external corpus.

use crate::error::CloudError;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct ReferenceWordlist {
    counts: HashMap<String, u64, ahash::RandomState>,
}

impl ReferenceWordlist {
    /// Read and parse a wordlist file. Nothing is returned unless every row parses.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("open wordlist {}", path.display()))?;
        let list = Self::parse_str(&text).with_context(|| format!("parse wordlist {}", path.display()))?;
        tracing::info!("Loaded {} reference words from {}", list.len(), path.display());
        Ok(list)
    }

    /// Parse wordlist text. Blank lines are skipped; any other malformed row fails the whole parse.
    pub fn parse_str(text: &str) -> Result<Self, CloudError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut counts: HashMap<String, u64, ahash::RandomState> = HashMap::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (word, count) = parse_row(line).map_err(|reason| CloudError::WordlistFormat { line: idx + 1, reason })?;
            let slot = counts.entry(word).or_insert(0);
            *slot = (*slot).max(count);
        }
        Ok(Self { counts })
    }

    #[inline]
    pub fn get(&self, word: &str) -> Option<u64> {
        self.counts.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Word → count view, as consumed by `reweight`.
    pub fn counts(&self) -> &HashMap<String, u64, ahash::RandomState> {
        &self.counts
    }
}

fn parse_row(line: &str) -> Result<(String, u64), String> {
    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() != 3 {
        return Err(format!("expected 3 ';'-separated fields (rank;word;count), found {}", fields.len()));
    }
    let rank = fields[0].trim();
    rank.parse::<u64>().map_err(|_| format!("rank {rank:?} is not a number"))?;

    let word = fields[1].trim().to_lowercase();
    if word.is_empty() {
        return Err("empty word".to_string());
    }

    // Counts may carry thousands separators ("1 234 567", also NBSP variants).
    let digits: String = fields[2].chars().filter(|c| !c.is_whitespace()).collect();
    let count: u64 = digits.parse().map_err(|_| format!("count {:?} is not a number", fields[2].trim()))?;
    if count == 0 {
        return Err(format!("count for {word:?} must be positive"));
    }
    Ok((word, count))
}
