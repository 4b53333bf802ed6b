#[path = "common/mod.rs"]
mod common;

use common::*;
use anyhow::{anyhow, Result};
use rwc::{
    assemble, comment_page, flatten_forest, hot_ids, normalize_submission_id, parse_comment_page, parse_more_children,
    parse_post_ids, resolve_more, CommentSource, ListingApi, ListingFile, RawComment, Target,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;

fn raw(id: &str, parent: &str, body: &str) -> RawComment {
    RawComment { id: id.into(), parent_id: parent.into(), body: body.into(), created_utc: None }
}

/// Nested `replies` listings, empty-string replies and `more` stubs all decode.
#[test]
fn comment_page_decodes_tree_and_more_stubs() {
    let parsed = parse_comment_page(&comment_page_json()).unwrap();
    assert_eq!(parsed.id, "abc123");
    assert_eq!(parsed.title, "Ask: favourite crate?");
    let ids: Vec<&str> = parsed.comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert_eq!(parsed.comments[0].created_utc, Some(1136074600));
    assert_eq!(parsed.more.len(), 2);
    assert_eq!(parsed.more[0].parent_id, "t1_c1");
    assert_eq!(parsed.more[0].children, vec!["c9", "c10"]);

    let thread = parsed.into_thread();
    assert_eq!(thread.comments.len(), 2);
    assert_eq!(thread.comment_count(), 3);
    assert_eq!(
        flatten_forest(&thread.comments),
        vec!["serde is great ", "agreed, serde everywhere", "tokio for async"]
    );
}

#[test]
fn comment_page_rejects_wrong_shape() {
    assert!(parse_comment_page(&json!({})).is_err());
    assert!(parse_comment_page(&json!([{"kind": "Listing", "data": {"children": []}}])).is_err());
}

/// Comments loaded through `morechildren` attach under their parent, after loaded siblings.
#[test]
fn more_children_merge_into_the_tree() {
    let mut parsed = parse_comment_page(&comment_page_json()).unwrap();
    let resp = json!({"json": {"errors": [], "data": {"things": [
        {"kind": "t1", "data": {"id": "c9", "parent_id": "t1_c1", "body": "late reply", "replies": ""}},
        {"kind": "more", "data": {"parent_id": "t1_c9", "children": ["c12"]}}
    ]}}});
    let (comments, more) = parse_more_children(&resp).unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(more.len(), 1);
    parsed.comments.extend(comments);

    let thread = parsed.into_thread();
    assert_eq!(
        flatten_forest(&thread.comments),
        vec!["serde is great ", "agreed, serde everywhere", "late reply", "tokio for async"]
    );

    let failed = json!({"json": {"errors": [["RATELIMIT", "slow down"]], "data": {"things": []}}});
    assert!(parse_more_children(&failed).is_err());
}

#[test]
fn post_ids_from_subreddit_listing() {
    let v = json!({"kind": "Listing", "data": {"after": null, "children": [
        {"kind": "t3", "data": {"id": "p1"}},
        {"kind": "t3", "data": {"id": "p2"}},
        {"kind": "t5", "data": {"id": "ignored"}}
    ]}});
    assert_eq!(parse_post_ids(&v).unwrap(), vec!["p1", "p2"]);
}

/// Orphans and self-parented comments become top-level; input order is kept among siblings.
#[test]
fn assemble_handles_orphans() {
    let forest = assemble(vec![
        raw("a", "t3_s", "A"),
        raw("b", "t1_a", "B"),
        raw("o", "t1_gone", "orphan"),
        raw("c", "t1_a", "C"),
        raw("s", "t1_s", "self"),
    ]);
    assert_eq!(forest.len(), 3);
    assert_eq!(flatten_forest(&forest), vec!["A", "B", "C", "orphan", "self"]);
}

/// A parent cycle is broken at its first member instead of losing the comments.
#[test]
fn assemble_breaks_parent_cycles() {
    let forest = assemble(vec![raw("a", "t1_b", "A"), raw("b", "t1_a", "B"), raw("r", "t3_s", "R")]);
    let total: usize = forest.iter().map(|n| n.node_count()).sum();
    assert_eq!(total, 3);
    assert_eq!(flatten_forest(&forest), vec!["R", "A", "B"]);
}

#[test]
fn submission_ids_are_normalized() {
    assert_eq!(normalize_submission_id("t3_abc123"), "abc123");
    assert_eq!(normalize_submission_id(" abc123 "), "abc123");
    assert_eq!(normalize_submission_id("https://www.reddit.com/r/rust/comments/abc123/some_title/"), "abc123");
    assert_eq!(normalize_submission_id("https://old.reddit.com/comments/xyz9?context=3"), "xyz9");
    assert_eq!(Target::subreddit("r/Rust", 0), Target::Subreddit { name: "rust".into(), posts: 1 });
    assert_eq!(Target::submission("t3_q"), Target::Submission("q".into()));
}

#[test]
fn listing_file_source_reads_saved_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_comment_page(dir.path());
    let threads = ListingFile::new(&path).fetch(&Target::submission("abc123")).unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id, "abc123");
    assert_eq!(threads[0].comment_count(), 3);

    assert!(ListingFile::new(dir.path().join("missing.json")).fetch(&Target::submission("abc123")).is_err());
}

/// Canned API: responses keyed by path plus the `after`/`children` parameter.
/// Unknown `morechildren` batches answer with no things; other unknown routes fail.
#[derive(Default)]
struct CannedApi {
    routes: HashMap<String, Value>,
    calls: RefCell<Vec<(String, HashMap<String, String>)>>,
}

impl CannedApi {
    fn route(mut self, key: &str, v: Value) -> Self {
        self.routes.insert(key.to_string(), v);
        self
    }

    fn paths(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(p, _)| p.clone()).collect()
    }

    fn param(&self, call: usize, key: &str) -> String {
        self.calls.borrow()[call].1.get(key).cloned().unwrap_or_default()
    }
}

impl ListingApi for CannedApi {
    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let params: HashMap<String, String> = query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        let mut key = path.to_string();
        for k in ["after", "children"] {
            if let Some(v) = params.get(k) {
                key.push_str(&format!(" {k}={v}"));
            }
        }
        self.calls.borrow_mut().push((path.to_string(), params));
        match self.routes.get(&key) {
            Some(v) => Ok(v.clone()),
            None if path == "/api/morechildren" => Ok(more_response(vec![])),
            None => Err(anyhow!("no canned response for {key}")),
        }
    }
}

fn more_response(things: Vec<Value>) -> Value {
    json!({"json": {"errors": [], "data": {"things": things}}})
}

fn t1(id: &str, parent: &str, body: &str) -> Value {
    json!({"kind": "t1", "data": {"id": id, "parent_id": parent, "body": body, "replies": ""}})
}

fn more(parent: &str, children: &[&str]) -> Value {
    json!({"kind": "more", "data": {"parent_id": parent, "children": children}})
}

/// The fixture page has stubs (c9,c10) under c1 and (c11) at top level; c9's batch
/// yields a nested stub (c12).
fn api_with_more() -> CannedApi {
    CannedApi::default()
        .route("/comments/abc123", comment_page_json())
        .route(
            "/api/morechildren children=c9,c10",
            more_response(vec![t1("c9", "t1_c1", "nine"), more("t1_c9", &["c12"])]),
        )
        .route("/api/morechildren children=c11", more_response(vec![t1("c11", "t3_abc123", "eleven")]))
        .route("/api/morechildren children=c12", more_response(vec![t1("c12", "t1_c9", "twelve")]))
}

#[test]
fn resolve_more_without_limit_follows_nested_stubs() {
    let api = api_with_more();
    let mut parsed = comment_page(&api, "abc123").unwrap();
    let replaced = resolve_more(&api, &mut parsed, None).unwrap();

    assert_eq!(replaced, 3);
    assert_eq!(api.param(1, "children"), "c9,c10");
    assert_eq!(api.param(2, "children"), "c11");
    assert_eq!(api.param(3, "children"), "c12");
    assert_eq!(api.param(1, "link_id"), "t3_abc123");
    assert!(parsed.more.is_empty());

    let thread = parsed.into_thread();
    assert_eq!(
        flatten_forest(&thread.comments),
        vec!["serde is great ", "agreed, serde everywhere", "nine", "twelve", "tokio for async", "eleven"]
    );
}

#[test]
fn resolve_more_honours_the_limit() {
    let api = api_with_more();
    let mut parsed = comment_page(&api, "abc123").unwrap();
    assert_eq!(resolve_more(&api, &mut parsed, Some(0)).unwrap(), 0);
    assert_eq!(api.paths(), vec!["/comments/abc123"]);
    assert_eq!(parsed.comments.len(), 3);

    let api = api_with_more();
    let mut parsed = comment_page(&api, "abc123").unwrap();
    assert_eq!(resolve_more(&api, &mut parsed, Some(1)).unwrap(), 1);
    assert_eq!(api.paths().len(), 2);
    let ids: Vec<&str> = parsed.comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3", "c9"]);

    // The nested stub counts toward the limit like any other.
    let api = api_with_more();
    let mut parsed = comment_page(&api, "abc123").unwrap();
    assert_eq!(resolve_more(&api, &mut parsed, Some(2)).unwrap(), 2);
    assert_eq!(api.param(2, "children"), "c11");
    assert_eq!(api.paths().len(), 3);
}

/// A stub with 250 child ids is fetched in batches of 100, 100 and 50, and counts once.
#[test]
fn resolve_more_batches_child_ids() {
    let ids: Vec<String> = (0..250).map(|i| format!("k{i}")).collect();
    let page = json!([
        {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {"id": "big", "title": "Big"}}]}},
        {"kind": "Listing", "data": {"children": [
            {"kind": "more", "data": {"parent_id": "t3_big", "children": ids}}
        ]}}
    ]);
    let api = CannedApi::default().route("/comments/big", page);
    let mut parsed = comment_page(&api, "big").unwrap();
    assert_eq!(resolve_more(&api, &mut parsed, Some(1)).unwrap(), 1);

    let sizes: Vec<usize> = (1..4).map(|i| api.param(i, "children").split(',').count()).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
    assert!(api.param(1, "children").starts_with("k0,k1,"));
    assert!(api.param(3, "children").ends_with(",k249"));
}

/// "Continue this thread" stubs have no child ids; their subtree comes from the
/// parent's permalink page, without duplicating the parent.
#[test]
fn resolve_more_follows_continue_this_thread() {
    let page = json!([
        {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {"id": "deep", "title": "Deep"}}]}},
        {"kind": "Listing", "data": {"children": [
            {"kind": "t1", "data": {"id": "c1", "parent_id": "t3_deep", "body": "top",
                "replies": {"kind": "Listing", "data": {"children": [
                    {"kind": "more", "data": {"parent_id": "t1_c1", "id": "_", "count": 0, "children": []}}
                ]}}}}
        ]}}
    ]);
    let continued = json!([
        {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {"id": "deep", "title": "Deep"}}]}},
        {"kind": "Listing", "data": {"children": [
            {"kind": "t1", "data": {"id": "c1", "parent_id": "t3_deep", "body": "top",
                "replies": {"kind": "Listing", "data": {"children": [
                    {"kind": "t1", "data": {"id": "c20", "parent_id": "t1_c1", "body": "deeper",
                        "replies": {"kind": "Listing", "data": {"children": [
                            t1("c21", "t1_c20", "deepest")
                        ]}}}}
                ]}}}}
        ]}}
    ]);

    let api = CannedApi::default().route("/comments/deep", page.clone()).route("/comments/deep/_/c1", continued);
    let mut parsed = comment_page(&api, "deep").unwrap();
    assert_eq!(parsed.more[0].children.len(), 0);
    assert_eq!(resolve_more(&api, &mut parsed, None).unwrap(), 1);
    assert_eq!(api.paths(), vec!["/comments/deep", "/comments/deep/_/c1"]);

    let thread = parsed.into_thread();
    assert_eq!(thread.comment_count(), 3);
    assert_eq!(flatten_forest(&thread.comments), vec!["top", "deeper", "deepest"]);

    let api = CannedApi::default().route("/comments/deep", page);
    let mut parsed = comment_page(&api, "deep").unwrap();
    assert_eq!(resolve_more(&api, &mut parsed, Some(0)).unwrap(), 0);
    assert_eq!(parsed.into_thread().comment_count(), 1);
}

fn hot_page(ids: &[&str], after: Option<&str>) -> Value {
    let children: Vec<Value> = ids.iter().map(|id| json!({"kind": "t3", "data": {"id": id}})).collect();
    json!({"kind": "Listing", "data": {"after": after, "children": children}})
}

#[test]
fn hot_ids_follow_the_after_cursor_and_truncate() {
    let api = CannedApi::default()
        .route("/r/rust/hot", hot_page(&["p1", "p2"], Some("t3_p2")))
        .route("/r/rust/hot after=t3_p2", hot_page(&["p3", "p4"], Some("t3_p4")));

    assert_eq!(hot_ids(&api, "rust", 3).unwrap(), vec!["p1", "p2", "p3"]);
    assert_eq!(api.param(0, "limit"), "3");
    assert_eq!(api.param(1, "limit"), "1");
    assert_eq!(api.param(1, "after"), "t3_p2");
}

#[test]
fn hot_ids_stop_when_the_feed_ends() {
    let api = CannedApi::default()
        .route("/r/rust/hot", hot_page(&["p1", "p2"], Some("t3_p2")))
        .route("/r/rust/hot after=t3_p2", hot_page(&["p3"], None));
    assert_eq!(hot_ids(&api, "rust", 250).unwrap(), vec!["p1", "p2", "p3"]);
    assert_eq!(api.param(0, "limit"), "100");
    assert_eq!(api.paths().len(), 2);

    let empty = CannedApi::default().route("/r/quiet/hot", hot_page(&[], Some("t3_x")));
    assert!(hot_ids(&empty, "quiet", 5).unwrap().is_empty());
}
