use crate::error::CloudError;
use crate::reweight::validate_params;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CREDENTIALS_FILE: &str = "config.json";

/// Reweighting against a reference wordlist (off unless configured).
#[derive(Clone, Debug, PartialEq)]
pub struct ReweightOptions {
    pub wordlist: PathBuf,
    pub min_relative_freq: f64, // count / total below this is dropped
    pub boost: f64,             // multiplier for words missing from the wordlist
    pub blow: f64,              // divisor for words present in the wordlist
}

impl Default for ReweightOptions {
    fn default() -> Self {
        Self {
            wordlist: PathBuf::from("wordlist.csv"),
            min_relative_freq: 0.0005,
            boost: 2.0,
            blow: 1.0,
        }
    }
}

impl ReweightOptions {
    pub fn with_wordlist(mut self, path: impl AsRef<Path>) -> Self {
        self.wordlist = path.as_ref().to_path_buf();
        self
    }
    pub fn with_min_relative_freq(mut self, v: f64) -> Self {
        self.min_relative_freq = v;
        self
    }
    pub fn with_boost(mut self, v: f64) -> Self {
        self.boost = v;
        self
    }
    pub fn with_blow(mut self, v: f64) -> Self {
        self.blow = v;
        self
    }

    pub fn validate(&self) -> Result<(), CloudError> {
        validate_params(self.min_relative_freq, self.boost, self.blow)
    }
}

/// Outline drawn around the mask shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub width: u32,
    pub color: String,
}

/// Options handed through to the renderer untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub scale: u32,
    pub background: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<PathBuf>,
    pub color_from_mask: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contour: Option<Contour>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            scale: 1,
            background: "black".to_string(),
            mask: None,
            color_from_mask: false,
            contour: None,
            font: None,
        }
    }
}

/// Word cloud options with defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct CloudOptions {
    pub max_words: usize,
    pub languages: Vec<String>, // extra stopword languages; English always applies
    pub fold_plurals: bool,
    pub reweight: Option<ReweightOptions>,
    pub render: RenderSettings,
    pub output: Option<PathBuf>,
}

impl Default for CloudOptions {
    fn default() -> Self {
        Self {
            max_words: 200,
            languages: Vec::new(),
            fold_plurals: true,
            reweight: None,
            render: RenderSettings::default(),
            output: None,
        }
    }
}

impl CloudOptions {
    pub fn with_max_words(mut self, n: usize) -> Self {
        self.max_words = n.max(1);
        self
    }
    pub fn with_languages<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = langs.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_fold_plurals(mut self, yes: bool) -> Self {
        self.fold_plurals = yes;
        self
    }
    pub fn with_reweight(mut self, opts: ReweightOptions) -> Self {
        self.reweight = Some(opts);
        self
    }
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.render.scale = scale.max(1);
        self
    }
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.render.background = color.into();
        self
    }
    pub fn with_mask(mut self, path: impl AsRef<Path>, color_from_mask: bool) -> Self {
        self.render.mask = Some(path.as_ref().to_path_buf());
        self.render.color_from_mask = color_from_mask;
        self
    }
    pub fn with_contour(mut self, width: u32, color: impl Into<String>) -> Self {
        self.render.contour = Some(Contour { width, color: color.into() });
        self
    }
    pub fn with_font(mut self, path: impl AsRef<Path>) -> Self {
        self.render.font = Some(path.as_ref().to_path_buf());
        self
    }
    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reject unusable settings before anything is fetched.
    pub fn validate(&self) -> Result<(), CloudError> {
        if let Some(rw) = &self.reweight {
            rw.validate()?;
        }
        if self.render.color_from_mask && self.render.mask.is_none() {
            return Err(CloudError::InvalidConfig("coloring from the mask requires a mask image".into()));
        }
        Ok(())
    }
}

/// How comments are collected from a source.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub posts: usize,               // subreddit mode: number of threads
    pub more_limit: Option<usize>,  // "load more comments" rounds; None resolves all
    pub file_concurrency: usize,    // archive source: monthly files scanned in parallel
    pub progress: bool,
    pub progress_label: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            posts: 25,
            more_limit: None,
            file_concurrency: 1,
            progress: true,
            progress_label: None,
        }
    }
}

impl FetchOptions {
    pub fn with_posts(mut self, n: usize) -> Self {
        self.posts = n.max(1);
        self
    }
    pub fn with_more_limit(mut self, limit: Option<usize>) -> Self {
        self.more_limit = limit;
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
}

/// Script-app credentials stored as `{"client_id": "...", "secret": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub secret: String,
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read credentials {} (run `rwc configure` first)", path.display()))?;
        let creds: Credentials =
            serde_json::from_str(&text).with_context(|| format!("parse credentials {}", path.display()))?;
        Ok(creds)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        crate::util::write_atomic(path, text.as_bytes())
    }
}
