//! Comment trees and their pre-order flattening into a text corpus.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;

/// One posted message and its ordered replies. No replies means a leaf.
///
/// Traversal, counting and drop are iterative. The derived `Debug` and serde
/// impls recurse, so trees thousands of levels deep should not go through them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CommentNode {
    pub body: String,
    #[serde(default)]
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn leaf(body: impl Into<String>) -> Self {
        Self { body: body.into(), replies: Vec::new() }
    }

    pub fn with_replies(body: impl Into<String>, replies: Vec<CommentNode>) -> Self {
        Self { body: body.into(), replies }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.replies.is_empty()
    }

    /// Number of nodes in the subtree rooted here (including `self`).
    pub fn node_count(&self) -> usize {
        let mut n = 0usize;
        let mut stack: Vec<&CommentNode> = vec![self];
        while let Some(node) = stack.pop() {
            n += 1;
            stack.extend(node.replies.iter());
        }
        n
    }
}

// Reply chains can be arbitrarily deep; tear them down without recursion.
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.replies);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.replies);
        }
    }
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Alternation order matters: wrapped forms must win over the bare URL
        // so their brackets go with it, and a bare URL ending in a balanced
        // `(...)` group (wiki links) must win over the shorter bare match.
        Regex::new(
            r#"(?x)
            \[(?P<label>[^\[\]]*)\]\(\s*<?(?i:https?)://[^\s()<>]*(?:\([^\s()<>]*\)[^\s()<>]*)*>?
                (?:\s+(?:"[^"]*"|'[^']*'))?\s*\)
            | <\s*(?i:https?)://[^\s>]*>
            | \(\s*(?i:https?)://[^\s()<>]*(?:\([^\s()<>]*\)[^\s()<>]*)*\s*\)
            | \[\s*(?i:https?)://[^\s\]]*\]
            | (?i:https?)://(?:[^\s<>()\[\]"]*\([^\s<>()\[\]"]*\))+(?:[^\s<>()\[\]"]*[^\s<>()\[\]".,;:!?'])?
            | (?i:https?)://[^\s<>()\[\]"]*[^\s<>()\[\]".,;:!?']
            "#,
        )
        .unwrap()
    })
}

/// Remove http(s) URLs from a comment body.
///
/// Markdown links `[label](url)`, `[label](<url>)` and `[label](url "title")` keep
/// their label; URLs wrapped in `<>`, `()` or `[]` are removed with their brackets;
/// one level of balanced parentheses inside a URL path belongs to the URL; bare
/// URLs lose trailing sentence punctuation to the surrounding text. Stripping repeats until nothing matches, so the
/// result is a fixpoint.
pub fn strip_urls(text: &str) -> Cow<'_, str> {
    let re = url_regex();
    let mut out: Cow<'_, str> = Cow::Borrowed(text);
    loop {
        let next = re.replace_all(&out, |caps: &Captures<'_>| {
            caps.name("label").map_or(String::new(), |m| m.as_str().to_string())
        });
        match next {
            // Nothing matched this round.
            Cow::Borrowed(_) => return out,
            Cow::Owned(s) => out = Cow::Owned(s),
        }
    }
}

/// Pre-order flattening: the node's cleaned body first, then each reply's
/// flattened output in order. Output length equals `root.node_count()`.
pub fn flatten(root: &CommentNode) -> Vec<String> {
    let mut out = Vec::new();
    flatten_into(root, &mut out);
    out
}

/// Flatten every top-level comment of a thread, concatenated in order.
pub fn flatten_forest(roots: &[CommentNode]) -> Vec<String> {
    let mut out = Vec::new();
    for root in roots {
        flatten_into(root, &mut out);
    }
    out
}

fn flatten_into(root: &CommentNode, out: &mut Vec<String>) {
    // Explicit stack; children pushed in reverse so the first reply pops first.
    let mut stack: Vec<&CommentNode> = vec![root];
    while let Some(node) = stack.pop() {
        out.push(strip_urls(&node.body).into_owned());
        stack.extend(node.replies.iter().rev());
    }
}
