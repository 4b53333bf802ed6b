//! What to fetch, and the trait every comment source implements.

use crate::listing::{parse_comment_page, Thread};
use crate::util::normalize_sub;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A single submission or the top of a subreddit feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Submission(String),
    Subreddit { name: String, posts: usize },
}

impl Target {
    /// Accepts a bare id, a `t3_` fullname, or a comments URL
    /// (`https://www.reddit.com/r/x/comments/abc123/title/`).
    pub fn submission(id: impl AsRef<str>) -> Self {
        Target::Submission(normalize_submission_id(id.as_ref()))
    }

    pub fn subreddit(name: impl AsRef<str>, posts: usize) -> Self {
        Target::Subreddit { name: normalize_sub(name.as_ref()), posts: posts.max(1) }
    }
}

pub fn normalize_submission_id(raw: &str) -> String {
    let s = raw.trim();
    if let Some(pos) = s.find("/comments/") {
        let rest = &s[pos + "/comments/".len()..];
        return rest.split(['/', '?', '#']).next().unwrap_or_default().to_string();
    }
    s.strip_prefix("t3_").unwrap_or(s).to_string()
}

/// Anything that yields comment threads for a target.
pub trait CommentSource {
    fn fetch(&self, target: &Target) -> Result<Vec<Thread>>;
}

/// A saved `/comments/{id}.json` response on disk. Only answers submission targets.
#[derive(Clone, Debug)]
pub struct ListingFile {
    path: PathBuf,
}

impl ListingFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl CommentSource for ListingFile {
    fn fetch(&self, target: &Target) -> Result<Vec<Thread>> {
        let text = fs::read_to_string(&self.path).with_context(|| format!("open listing {}", self.path.display()))?;
        let v: serde_json::Value =
            serde_json::from_str(&text).with_context(|| format!("decode listing {}", self.path.display()))?;
        let parsed = parse_comment_page(&v).with_context(|| format!("listing {}", self.path.display()))?;

        match target {
            Target::Submission(id) if !id.is_empty() && *id != parsed.id => {
                tracing::warn!("listing {} holds submission {}, not {}", self.path.display(), parsed.id, id);
            }
            Target::Subreddit { name, .. } => {
                tracing::warn!("listing file holds a single thread; ignoring subreddit target r/{}", name);
            }
            _ => {}
        }
        if !parsed.more.is_empty() {
            tracing::info!("listing has {} unresolved 'more comments' stubs (offline)", parsed.more.len());
        }
        Ok(vec![parsed.into_thread()])
    }
}
