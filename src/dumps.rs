//! Monthly dump layout: `comments/RC_YYYY-MM.zst`, `submissions/RS_YYYY-MM.zst`.

use anyhow::{anyhow, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use time::OffsetDateTime;
use walkdir::WalkDir;

/// "YYYY-MM", ordered chronologically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: u16,
    pub month: u8, // 1..=12
}

impl YearMonth {
    pub fn new(year: u16, month: u8) -> Self {
        assert!((1..=12).contains(&month), "Month must be 1..=12");
        Self { year, month }
    }

    /// Month containing a unix timestamp (UTC). Out-of-range timestamps map to 1970-01.
    pub fn from_epoch(ts: i64) -> Self {
        let date = OffsetDateTime::from_unix_timestamp(ts).unwrap_or(OffsetDateTime::UNIX_EPOCH).date();
        Self { year: date.year().clamp(0, u16::MAX as i32) as u16, month: date.month() as u8 }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let (y, m) = s.trim().split_once('-').ok_or_else(|| anyhow!("expected YYYY-MM, got {s:?}"))?;
        let year: u16 = y.parse().map_err(|_| anyhow!("invalid year in {s:?}"))?;
        let month: u8 = m.parse().map_err(|_| anyhow!("invalid month in {s:?}"))?;
        if !(1..=12).contains(&month) {
            return Err(anyhow!("month must be 01..12, got {s:?}"));
        }
        Ok(Self { year, month })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DumpKind {
    Comments,    // RC_YYYY-MM.zst
    Submissions, // RS_YYYY-MM.zst
}

impl DumpKind {
    fn subdir(self) -> &'static str {
        match self {
            DumpKind::Comments => "comments",
            DumpKind::Submissions => "submissions",
        }
    }
    fn file_regex(self) -> Regex {
        match self {
            DumpKind::Comments => Regex::new(r"^RC_(\d{4})-(\d{2})\.zst$").unwrap(),
            DumpKind::Submissions => Regex::new(r"^RS_(\d{4})-(\d{2})\.zst$").unwrap(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DumpFile {
    pub kind: DumpKind,
    pub ym: YearMonth,
    pub path: PathBuf,
}

/// Monthly files of one kind under `base/<kind>/`, limited to the inclusive range.
/// Missing directories and months are skipped silently.
pub fn plan_dumps(base: &Path, kind: DumpKind, start: Option<YearMonth>, end: Option<YearMonth>) -> Vec<DumpFile> {
    let dir = base.join(kind.subdir());
    if !dir.exists() {
        return Vec::new();
    }
    let re = kind.file_regex();
    let mut found: BTreeMap<YearMonth, PathBuf> = BTreeMap::new();
    for ent in WalkDir::new(&dir).min_depth(1).max_depth(1).into_iter().flatten() {
        let Some(name) = ent.file_name().to_str() else { continue };
        let Some(caps) = re.captures(name) else { continue };
        let (Ok(year), Ok(month)) = (caps[1].parse::<u16>(), caps[2].parse::<u8>()) else { continue };
        if !(1..=12).contains(&month) {
            continue;
        }
        found.insert(YearMonth { year, month }, ent.path().to_path_buf());
    }
    found
        .into_iter()
        .filter(|(ym, _)| start.map_or(true, |s| *ym >= s) && end.map_or(true, |e| *ym <= e))
        .map(|(ym, path)| DumpFile { kind, ym, path })
        .collect()
}
