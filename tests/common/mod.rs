#![allow(dead_code)]

use rwc::CommentNode;
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write a compressed `.zst` file containing the provided JSONL lines.
/// This mirrors the corpus's RC_/RS_ monthly files but with tiny content.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

fn comment(id: &str, link: &str, parent: &str, body: &str, created: i64, sub: &str) -> String {
    json!({
        "id": id, "link_id": format!("t3_{link}"), "parent_id": parent, "body": body,
        "author": "someone", "subreddit": sub, "score": 1, "created_utc": created
    })
    .to_string()
}

/// Build a tiny dump directory:
/// - RS_2006-01: s1 "Rust news" (r/programming, score 183), s2 "Meta: rules"
///   (r/programming, score 1), s3 "Cats" (r/aww, score 500).
/// - RC_2006-01: on s1, c3 "first!" (earliest top-level), c1 with a URL,
///   c2 replying to c1; c4 on s2; c6 on s3. `created_utc` is a string on c6,
///   as in some older dumps.
/// - RC_2006-02: c5 on s1 replying to c2 (thread continues into the next month).
pub fn make_dump_basic() -> PathBuf {
    let base = tempfile::tempdir().unwrap().into_path();

    let rs = vec![
        json!({"id":"s1","subreddit":"programming","score":183,"title":"Rust news","created_utc":1136073600}).to_string(),
        json!({"id":"s2","subreddit":"programming","score":1,"title":"Meta: rules","created_utc":1136073601}).to_string(),
        json!({"id":"s3","subreddit":"aww","score":500,"title":"Cats","created_utc":1136073602}).to_string(),
    ];
    write_zst_lines(&base.join("submissions").join("RS_2006-01.zst"), &rs);

    let rc_jan = vec![
        comment("c1", "s1", "t3_s1", "I love Rust http://rust-lang.org", 1136074600, "programming"),
        comment("c2", "s1", "t1_c1", "reply to alice", 1136074700, "programming"),
        comment("c3", "s1", "t3_s1", "first!", 1136074500, "programming"),
        comment("c4", "s2", "t3_s2", "rules are rules", 1136074900, "programming"),
        json!({"id":"c6","link_id":"t3_s3","parent_id":"t3_s3","body":"kitty","subreddit":"aww","created_utc":"1136075000"})
            .to_string(),
    ];
    write_zst_lines(&base.join("comments").join("RC_2006-01.zst"), &rc_jan);

    let rc_feb = vec![comment("c5", "s1", "t1_c2", "late reply to charlie", 1138752000, "programming")];
    write_zst_lines(&base.join("comments").join("RC_2006-02.zst"), &rc_feb);

    base
}

/// Add RC_2006-03.zst with a correct name but plain-text (non-zstd) contents.
pub fn add_corrupt_month(base: &Path) {
    let corrupt = base.join("comments").join("RC_2006-03.zst");
    let mut f = File::create(corrupt).unwrap();
    writeln!(&mut f, "{{\"id\":\"bad\",\"link_id\":\"t3_s1\",\"parent_id\":\"t3_s1\",\"body\":\"x\"}}").unwrap();
}

/// A `/comments/abc123` response: c1 (with URL) → [c2, more(c9,c10)], c3, more(c11).
pub fn comment_page_json() -> Value {
    json!([
        {"kind": "Listing", "data": {"children": [
            {"kind": "t3", "data": {"id": "abc123", "title": "Ask: favourite crate?"}}
        ]}},
        {"kind": "Listing", "data": {"children": [
            {"kind": "t1", "data": {
                "id": "c1", "parent_id": "t3_abc123", "body": "serde is great https://serde.rs",
                "created_utc": 1136074600.0,
                "replies": {"kind": "Listing", "data": {"children": [
                    {"kind": "t1", "data": {
                        "id": "c2", "parent_id": "t1_c1", "body": "agreed, serde everywhere",
                        "created_utc": 1136074700.0, "replies": ""
                    }},
                    {"kind": "more", "data": {"parent_id": "t1_c1", "children": ["c9", "c10"], "count": 2}}
                ]}}
            }},
            {"kind": "t1", "data": {
                "id": "c3", "parent_id": "t3_abc123", "body": "tokio for async",
                "created_utc": 1136074800.0, "replies": ""
            }},
            {"kind": "more", "data": {"parent_id": "t3_abc123", "children": ["c11"], "count": 1}}
        ]}}
    ])
}

/// Write `comment_page_json()` into `dir` and return the file path.
pub fn write_comment_page(dir: &Path) -> PathBuf {
    let p = dir.join("abc123.json");
    fs::write(&p, comment_page_json().to_string()).unwrap();
    p
}

pub fn node(body: &str, replies: Vec<CommentNode>) -> CommentNode {
    CommentNode::with_replies(body, replies)
}

pub fn leaf(body: &str) -> CommentNode {
    CommentNode::leaf(body)
}
