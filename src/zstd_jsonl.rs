use crate::util::open_with_backoff;
use anyhow::Result;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use zstd::stream::read::Decoder;

/// Fields read from dump lines. Extra fields are ignored by serde.
/// Comments carry `body`/`link_id`/`parent_id`; submissions carry `title`.
#[derive(Debug, Default, Deserialize)]
pub struct DumpRecord {
    pub id: Option<String>,
    pub subreddit: Option<String>,
    pub score: Option<i64>,
    #[serde(default, deserialize_with = "lenient_epoch")]
    pub created_utc: Option<i64>,

    pub body: Option<String>,
    pub link_id: Option<String>,
    pub parent_id: Option<String>,

    pub title: Option<String>,
}

// Older dumps store epochs as strings, newer ones as integers or floats.
fn lenient_epoch<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    })
}

#[inline]
pub fn parse_record(line: &str) -> Result<DumpRecord> {
    Ok(serde_json::from_str(line)?)
}

fn warn_decode_skip(path: &Path, e: &anyhow::Error) {
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    tracing::warn!(
        "Skipping zstd file after decode error\n  path : {}\n  error: {}\n\
         note : This usually indicates file corruption; re-download this month.",
        abs.display(),
        e
    );
}

/// Stream a zstd JSONL file line-by-line. A file that fails to decode is
/// logged and skipped; errors returned by `on_line` propagate.
pub fn for_each_line(path: &Path, read_buf_bytes: usize, mut on_line: impl FnMut(&str) -> Result<()>) -> Result<()> {
    let mut callback_err: Option<anyhow::Error> = None;
    let res = stream_lines(path, read_buf_bytes, &mut |line: &str| match on_line(line) {
        Ok(()) => true,
        Err(e) => {
            callback_err = Some(e);
            false
        }
    });
    if let Some(e) = callback_err {
        return Err(e);
    }
    if let Err(e) = res {
        warn_decode_skip(path, &e);
    }
    Ok(())
}

fn stream_lines(path: &Path, read_buf_bytes: usize, on_line: &mut impl FnMut(&str) -> bool) -> Result<()> {
    let file = open_with_backoff(path)?;
    let mut decoder = Decoder::new(file)?;
    // Large frames otherwise fail with "Frame requires too much memory".
    decoder.window_log_max(31)?;
    let mut reader = BufReader::with_capacity(read_buf_bytes.max(8 * 1024), decoder);

    let mut buf = String::with_capacity(16 * 1024);
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            continue;
        }
        if !on_line(line) {
            break;
        }
    }
    Ok(())
}
