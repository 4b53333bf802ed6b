//! Reddit listing JSON → threads.
//!
//! Comments are first collected as flat `RawComment` records (the listing
//! walk, `morechildren` responses and dump files all yield that shape) and
//! then assembled into reply trees by `parent_id`.

use crate::comments::CommentNode;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One submission with its top-level comment forest.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub comments: Vec<CommentNode>,
}

impl Thread {
    pub fn comment_count(&self) -> usize {
        self.comments.iter().map(CommentNode::node_count).sum()
    }
}

/// A comment before tree assembly. `parent_id` keeps its `t1_`/`t3_` prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawComment {
    pub id: String,
    pub parent_id: String,
    pub body: String,
    pub created_utc: Option<i64>,
}

/// A "load more comments" placeholder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoreStub {
    pub parent_id: String,
    pub children: Vec<String>,
}

/// A decoded `/comments/{id}` response, prior to assembly.
#[derive(Clone, Debug, Default)]
pub struct ParsedThread {
    pub id: String,
    pub title: String,
    pub comments: Vec<RawComment>,
    pub more: Vec<MoreStub>,
}

impl ParsedThread {
    pub fn into_thread(self) -> Thread {
        let comments = assemble(self.comments);
        Thread { id: self.id, title: self.title, comments }
    }
}

/// Decode the two-listing array returned for a submission's comment page.
pub fn parse_comment_page(v: &Value) -> Result<ParsedThread> {
    let pages = v.as_array().ok_or_else(|| anyhow!("comment page: expected a JSON array of two listings"))?;
    if pages.len() != 2 {
        return Err(anyhow!("comment page: expected 2 listings, found {}", pages.len()));
    }
    let post = listing_children(&pages[0])?
        .first()
        .and_then(|t| t.get("data"))
        .ok_or_else(|| anyhow!("comment page: missing submission"))?;
    let id = str_field(post, "id").ok_or_else(|| anyhow!("comment page: submission has no id"))?;
    let title = str_field(post, "title").unwrap_or_default();

    let (comments, more) = collect_things(listing_children(&pages[1])?);
    Ok(ParsedThread { id, title, comments, more })
}

/// Submission ids of a subreddit listing (`/r/{sub}/hot`), in listing order.
pub fn parse_post_ids(v: &Value) -> Result<Vec<String>> {
    Ok(listing_children(v)?
        .iter()
        .filter(|t| t.get("kind").and_then(Value::as_str) == Some("t3"))
        .filter_map(|t| t.get("data").and_then(|d| str_field(d, "id")))
        .collect())
}

/// Decode an `/api/morechildren` response: a flat list of things, each carrying its `parent_id`.
pub fn parse_more_children(v: &Value) -> Result<(Vec<RawComment>, Vec<MoreStub>)> {
    let json = v.get("json").ok_or_else(|| anyhow!("morechildren: missing `json`"))?;
    if let Some(errs) = json.get("errors").and_then(Value::as_array) {
        if !errs.is_empty() {
            return Err(anyhow!("morechildren: api errors {}", Value::Array(errs.clone())));
        }
    }
    let things = json
        .get("data")
        .and_then(|d| d.get("things"))
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("morechildren: missing `data.things`"))?;
    Ok(collect_things(things))
}

fn listing_children(v: &Value) -> Result<&Vec<Value>> {
    v.get("data")
        .and_then(|d| d.get("children"))
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("expected a Listing with data.children"))
}

fn str_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Walk `t1`/`more` things and their nested `replies` listings in pre-order.
fn collect_things(things: &[Value]) -> (Vec<RawComment>, Vec<MoreStub>) {
    let mut comments = Vec::new();
    let mut more = Vec::new();
    let mut stack: Vec<&Value> = things.iter().rev().collect();

    while let Some(thing) = stack.pop() {
        let Some(data) = thing.get("data") else { continue };
        match thing.get("kind").and_then(Value::as_str) {
            Some("t1") => {
                let (Some(id), Some(parent_id)) = (str_field(data, "id"), str_field(data, "parent_id")) else {
                    tracing::debug!("skipping comment without id/parent_id");
                    continue;
                };
                comments.push(RawComment {
                    id,
                    parent_id,
                    body: str_field(data, "body").unwrap_or_default(),
                    created_utc: data.get("created_utc").and_then(epoch_secs),
                });
                // `replies` is "" for leaves, a Listing otherwise.
                if let Ok(children) = listing_children(data.get("replies").unwrap_or(&Value::Null)) {
                    stack.extend(children.iter().rev());
                }
            }
            Some("more") => {
                let children: Vec<String> = data
                    .get("children")
                    .and_then(Value::as_array)
                    .map(|a| a.iter().filter_map(|c| c.as_str().map(str::to_string)).collect())
                    .unwrap_or_default();
                more.push(MoreStub { parent_id: str_field(data, "parent_id").unwrap_or_default(), children });
            }
            _ => {}
        }
    }
    (comments, more)
}

/// Reddit serializes epochs as floats (`1136074600.0`); dumps sometimes as strings.
fn epoch_secs(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

/// Assemble flat comments into reply trees.
///
/// Siblings keep their input order. A comment whose parent is a submission
/// (`t3_`) or is absent from `comments` becomes a top-level node. Comments
/// caught in a parent cycle are promoted to top level at the first member.
pub fn assemble(comments: Vec<RawComment>) -> Vec<CommentNode> {
    let n = comments.len();
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (i, c) in comments.iter().enumerate() {
        index.entry(c.id.as_str()).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots: Vec<usize> = Vec::new();
    for (i, c) in comments.iter().enumerate() {
        let parent = c.parent_id.strip_prefix("t1_").and_then(|p| index.get(p).copied());
        match parent {
            Some(p) if p != i => children[p].push(i),
            _ => roots.push(i),
        }
    }

    // Pre-order over the reachable forest; unreachable nodes only exist in cycles.
    let mut visited = vec![false; n];
    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut tree_children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut visit_from = |start: usize, visited: &mut Vec<bool>, order: &mut Vec<usize>| {
        visited[start] = true;
        let mut stack = vec![start];
        while let Some(u) = stack.pop() {
            order.push(u);
            let kids: Vec<usize> = children[u].iter().copied().filter(|&c| !visited[c]).collect();
            for &c in &kids {
                visited[c] = true;
            }
            stack.extend(kids.iter().rev());
            tree_children[u] = kids;
        }
    };
    for &r in &roots {
        visit_from(r, &mut visited, &mut order);
    }
    for i in 0..n {
        if !visited[i] {
            tracing::warn!("comment {} is part of a parent cycle; promoting to top level", comments[i].id);
            roots.push(i);
            visit_from(i, &mut visited, &mut order);
        }
    }
    drop(visit_from);

    let mut bodies: Vec<Option<String>> = comments.into_iter().map(|c| Some(c.body)).collect();
    let mut built: Vec<Option<CommentNode>> = (0..n).map(|_| None).collect();
    for &u in order.iter().rev() {
        let replies = tree_children[u].iter().filter_map(|&c| built[c].take()).collect();
        built[u] = Some(CommentNode { body: bodies[u].take().unwrap_or_default(), replies });
    }
    roots.into_iter().filter_map(|r| built[r].take()).collect()
}
