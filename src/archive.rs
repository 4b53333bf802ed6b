//! Offline source over monthly Reddit dumps.
//!
//! Submissions are picked from `RS_*.zst`, their comments collected from
//! `RC_*.zst` by `link_id` and assembled into reply trees by `parent_id`.

use crate::concurrency::for_each_dump_limited;
use crate::config::FetchOptions;
use crate::dumps::{plan_dumps, DumpFile, DumpKind, YearMonth};
use crate::listing::{assemble, RawComment, Thread};
use crate::progress::maybe_count_progress;
use crate::source::{CommentSource, Target};
use crate::zstd_jsonl::{for_each_line, parse_record, DumpRecord};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct Archive {
    base_dir: PathBuf,
    start: Option<YearMonth>, // inclusive
    end: Option<YearMonth>,   // inclusive
    read_buffer_bytes: usize,
    opts: FetchOptions,
}

#[derive(Clone, Debug)]
struct SubmissionRow {
    id: String,
    title: String,
    score: i64,
}

impl Archive {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            start: None,
            end: None,
            read_buffer_bytes: 256 * 1024,
            opts: FetchOptions::default(),
        }
    }
    pub fn date_range(mut self, start: Option<YearMonth>, end: Option<YearMonth>) -> Self {
        self.start = start;
        self.end = end;
        self
    }
    pub fn read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn options(mut self, opts: FetchOptions) -> Self {
        self.opts = opts;
        self
    }

    fn plan(&self, kind: DumpKind) -> Vec<DumpFile> {
        let files = plan_dumps(&self.base_dir, kind, self.start, self.end);
        if files.is_empty() {
            tracing::warn!("No {:?} dumps under {} for the selected range", kind, self.base_dir.display());
        } else {
            tracing::info!("Planned {} {:?} dump files", files.len(), kind);
        }
        files
    }

    /// Scan submission dumps, keeping rows accepted by `keep`.
    fn scan_submissions(&self, label: &str, keep: impl Fn(&DumpRecord) -> bool + Sync) -> Result<Vec<SubmissionRow>> {
        let files = self.plan(DumpKind::Submissions);
        let found: Mutex<Vec<SubmissionRow>> = Mutex::new(Vec::new());
        let pb = maybe_count_progress(self.opts.progress, files.len() as u64, None, label);

        for_each_dump_limited(&files, self.opts.file_concurrency, |file| {
            tracing::debug!(kind = ?file.kind, month = %file.ym, "scanning {}", file.path.display());
            let mut local = Vec::new();
            for_each_line(&file.path, self.read_buffer_bytes, |line| {
                let Ok(rec) = parse_record(line) else { return Ok(()) };
                if !keep(&rec) {
                    return Ok(());
                }
                if let Some(id) = rec.id {
                    local.push(SubmissionRow { id, title: rec.title.unwrap_or_default(), score: rec.score.unwrap_or(0) });
                }
                Ok(())
            })
            .with_context(|| format!("scanning {}", file.path.display()))?;
            found.lock().extend(local);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            Ok(())
        })?;

        if let Some(pb) = pb {
            pb.finish_with_message(format!("{label} done"));
        }
        Ok(found.into_inner())
    }

    /// Comments of the wanted submissions, grouped by bare submission id.
    fn collect_comments(&self, wanted: &HashSet<String>) -> Result<HashMap<String, Vec<RawComment>>> {
        let files = self.plan(DumpKind::Comments);
        let grouped: Mutex<HashMap<String, Vec<RawComment>>> = Mutex::new(HashMap::new());
        let pb = maybe_count_progress(self.opts.progress, files.len() as u64, self.opts.progress_label.as_deref(), "Fetching comments");

        for_each_dump_limited(&files, self.opts.file_concurrency, |file| {
            tracing::debug!(kind = ?file.kind, month = %file.ym, "scanning {}", file.path.display());
            let mut local: Vec<(String, RawComment)> = Vec::new();
            for_each_line(&file.path, self.read_buffer_bytes, |line| {
                let Ok(rec) = parse_record(line) else { return Ok(()) };
                let Some(link) = rec.link_id.as_deref().map(|l| l.strip_prefix("t3_").unwrap_or(l)) else {
                    return Ok(());
                };
                if !wanted.contains(link) {
                    return Ok(());
                }
                let (Some(id), Some(parent_id)) = (rec.id.clone(), rec.parent_id.clone()) else { return Ok(()) };
                local.push((
                    link.to_string(),
                    RawComment { id, parent_id, body: rec.body.unwrap_or_default(), created_utc: rec.created_utc },
                ));
                Ok(())
            })
            .with_context(|| format!("scanning {}", file.path.display()))?;

            let mut g = grouped.lock();
            for (link, c) in local {
                g.entry(link).or_default().push(c);
            }
            drop(g);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            Ok(())
        })?;

        if let Some(pb) = pb {
            pb.finish_with_message("Fetching comments done");
        }
        Ok(grouped.into_inner())
    }
}

impl CommentSource for Archive {
    fn fetch(&self, target: &Target) -> Result<Vec<Thread>> {
        let posts: Vec<SubmissionRow> = match target {
            Target::Submission(id) => {
                let rows = self.scan_submissions("Looking up submission", |r| r.id.as_deref() == Some(id.as_str()))?;
                // Comments may survive in the dumps even when the submission month is absent.
                let title = rows.into_iter().next().map(|r| r.title).unwrap_or_default();
                vec![SubmissionRow { id: id.clone(), title, score: 0 }]
            }
            Target::Subreddit { name, posts } => {
                let mut rows = self.scan_submissions("Ranking submissions", |r| {
                    r.subreddit.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(name))
                })?;
                rows.sort_by(|a, b| a.id.cmp(&b.id));
                rows.dedup_by(|a, b| a.id == b.id);
                rows.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
                rows.truncate(*posts);
                tracing::info!("Selected {} top submissions from r/{}", rows.len(), name);
                rows
            }
        };

        let wanted: HashSet<String> = posts.iter().map(|p| p.id.clone()).collect();
        let mut grouped = self.collect_comments(&wanted)?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let mut raw = grouped.remove(&post.id).unwrap_or_default();
                raw.sort_by(|a, b| a.id.cmp(&b.id));
                raw.dedup_by(|a, b| a.id == b.id);
                raw.sort_by(|a, b| {
                    a.created_utc.unwrap_or(i64::MAX).cmp(&b.created_utc.unwrap_or(i64::MAX)).then_with(|| a.id.cmp(&b.id))
                });
                let thread = Thread { id: post.id, title: post.title, comments: assemble(raw) };
                tracing::debug!("thread {} has {} comments", thread.id, thread.comment_count());
                thread
            })
            .collect())
    }
}
