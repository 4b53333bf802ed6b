//! Live source: Reddit's OAuth API (application-only, client credentials).

use crate::config::{Credentials, FetchOptions};
use crate::listing::{parse_comment_page, parse_more_children, parse_post_ids, MoreStub, ParsedThread, Thread};
use crate::progress::maybe_count_progress;
use crate::source::{CommentSource, Target};
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, info, warn};

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
const MAX_RETRIES: u32 = 3;
const PAGE_LIMIT: usize = 100; // listing and morechildren cap per request

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

pub struct RedditClient {
    http: Client,
    token: String,
    opts: FetchOptions,
}

fn user_agent() -> String {
    format!("{}:rwc:{} (comment word clouds)", std::env::consts::OS, env!("CARGO_PKG_VERSION"))
}

/// Send, retrying transport errors, 429 and 5xx with doubling delays.
fn send_with_retry(builder: RequestBuilder) -> Result<Response> {
    let mut delay = Duration::from_millis(500);
    for attempt in 0..=MAX_RETRIES {
        let req = builder.try_clone().ok_or_else(|| anyhow!("unable to clone request"))?;
        let retry_reason = match req.send() {
            Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS || resp.status().is_server_error() => {
                format!("HTTP {}", resp.status())
            }
            Ok(resp) => return resp.error_for_status().map_err(Into::into),
            Err(e) => format!("transport error: {e}"),
        };
        if attempt == MAX_RETRIES {
            return Err(anyhow!("giving up after {} attempts: {}", MAX_RETRIES + 1, retry_reason));
        }
        warn!("request attempt {}/{} failed ({}); retrying in {:?}", attempt + 1, MAX_RETRIES + 1, retry_reason, delay);
        sleep(delay);
        delay *= 2;
    }
    unreachable!("retry loop returns on its final attempt")
}

/// Authenticated GET returning decoded JSON. Paths are relative to the API root.
pub trait ListingApi {
    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value>;
}

impl RedditClient {
    /// Build the HTTP client and obtain an application-only bearer token.
    pub fn connect(creds: &Credentials, opts: FetchOptions) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent())
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("build HTTP client")?;

        let resp = send_with_retry(
            http.post(AUTH_URL)
                .basic_auth(&creds.client_id, Some(&creds.secret))
                .form(&[("grant_type", "client_credentials")]),
        )
        .context("request access token")?;
        let token: TokenResponse = resp.json().context("decode access token")?;
        info!("Authenticated with Reddit (token valid for {}s)", token.expires_in.unwrap_or(0));

        Ok(Self { http, token: token.access_token, opts })
    }
}

impl ListingApi for RedditClient {
    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{API_BASE}{path}");
        debug!("GET {url} {query:?}");
        let resp = send_with_retry(self.http.get(&url).bearer_auth(&self.token).query(query))
            .with_context(|| format!("GET {url}"))?;
        resp.json().with_context(|| format!("decode JSON from {url}"))
    }
}

/// Ids of the first `posts` hot submissions of `sub`, following the `after` cursor.
pub fn hot_ids(api: &impl ListingApi, sub: &str, posts: usize) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(posts);
    let mut after: Option<String> = None;
    while ids.len() < posts {
        let mut query = vec![("limit", (posts - ids.len()).min(PAGE_LIMIT).to_string()), ("raw_json", "1".into())];
        if let Some(a) = &after {
            query.push(("after", a.clone()));
        }
        let page = api.get_json(&format!("/r/{sub}/hot"), &query)?;
        let batch = parse_post_ids(&page).with_context(|| format!("r/{sub} listing"))?;
        if batch.is_empty() {
            break;
        }
        ids.extend(batch);
        after = page.get("data").and_then(|d| d.get("after")).and_then(Value::as_str).map(str::to_string);
        if after.is_none() {
            break;
        }
    }
    ids.truncate(posts);
    Ok(ids)
}

fn page_query() -> [(&'static str, String); 2] {
    [("raw_json", "1".into()), ("limit", "500".into())]
}

pub fn comment_page(api: &impl ListingApi, id: &str) -> Result<ParsedThread> {
    let page = api.get_json(&format!("/comments/{id}"), &page_query())?;
    parse_comment_page(&page).with_context(|| format!("comment page for {id}"))
}

/// Replace "load more comments" stubs, at most `more_limit` of them (`None` = all).
///
/// Stubs with child ids go through `/api/morechildren` in batches of 100.
/// "Continue this thread" stubs carry no ids; their subtree is read from the
/// parent comment's permalink page. Stubs found along the way are queued and
/// count toward the limit. Returns the number of stubs replaced.
pub fn resolve_more(api: &impl ListingApi, parsed: &mut ParsedThread, more_limit: Option<usize>) -> Result<usize> {
    let mut queue: VecDeque<MoreStub> = std::mem::take(&mut parsed.more).into();
    let mut replaced = 0usize;
    while let Some(stub) = queue.pop_front() {
        if more_limit.is_some_and(|limit| replaced >= limit) {
            debug!("more-comments limit reached; {} stubs left unresolved", queue.len() + 1);
            break;
        }
        if stub.children.is_empty() {
            let Some(parent) = stub.parent_id.strip_prefix("t1_") else {
                debug!("skipping empty stub under {}", stub.parent_id);
                continue;
            };
            let page = api.get_json(&format!("/comments/{}/_/{parent}", parsed.id), &page_query())?;
            let sub = parse_comment_page(&page).with_context(|| format!("continued thread under {parent}"))?;
            // The permalink page repeats the parent itself.
            parsed.comments.extend(sub.comments.into_iter().filter(|c| c.id != parent));
            queue.extend(sub.more);
        } else {
            for chunk in stub.children.chunks(PAGE_LIMIT) {
                let query = [
                    ("api_type", "json".to_string()),
                    ("link_id", format!("t3_{}", parsed.id)),
                    ("children", chunk.join(",")),
                    ("raw_json", "1".to_string()),
                ];
                let v = api.get_json("/api/morechildren", &query)?;
                let (comments, more) = parse_more_children(&v)?;
                parsed.comments.extend(comments);
                queue.extend(more);
            }
        }
        replaced += 1;
    }
    Ok(replaced)
}

impl CommentSource for RedditClient {
    fn fetch(&self, target: &Target) -> Result<Vec<Thread>> {
        let ids = match target {
            Target::Submission(id) => vec![id.clone()],
            Target::Subreddit { name, posts } => hot_ids(self, name, *posts)?,
        };
        let pb = maybe_count_progress(self.opts.progress, ids.len() as u64, self.opts.progress_label.as_deref(), "Fetching comments");

        let mut threads = Vec::with_capacity(ids.len());
        for id in &ids {
            let mut parsed = comment_page(self, id)?;
            resolve_more(self, &mut parsed, self.opts.more_limit).with_context(|| format!("resolve more comments for {id}"))?;
            let thread = parsed.into_thread();
            debug!("thread {} ({:?}): {} comments", thread.id, thread.title, thread.comment_count());
            threads.push(thread);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
        if let Some(pb) = pb {
            pb.finish_with_message("Fetching comments done");
        }
        Ok(threads)
    }
}
