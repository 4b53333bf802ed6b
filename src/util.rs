use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(io::stderr).try_init();
    });
}

/// Lowercase, trim, drop a leading `r/` or `/r/`.
#[inline]
pub fn normalize_sub(s: &str) -> String {
    let s = s.trim().to_lowercase();
    let s = s.strip_prefix('/').unwrap_or(&s);
    s.strip_prefix("r/").unwrap_or(s).trim_end_matches('/').to_string()
}

// -------- robust file ops with backoff (Windows-friendly) --------

const TRIES: usize = 16;
const DELAY_MS: u64 = 50;

/// Return true for transient/retriable I/O errors often seen on Windows when
/// filter drivers (AV/backup), USB/NAS volumes, or sharing violations occur.
fn is_retriable_io_error(e: &io::Error) -> bool {
    // 5 access denied, 21 device not ready, 32 sharing violation, 33 lock violation,
    // 225 AV blocked, 1006 volume altered, 1224 user-mapped section open
    matches!(e.raw_os_error(), Some(5 | 21 | 32 | 33 | 225 | 1006 | 1224))
}

/// Run `op` until it succeeds or fails with a non-transient error; linear backoff between tries.
fn with_backoff<T>(mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..TRIES {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(DELAY_MS.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "retries exhausted")))
}

pub fn open_with_backoff(path: &Path) -> io::Result<File> {
    with_backoff(|| File::open(path))
}

/// Write `bytes` to `dest` through a sibling temp file, then swap it in.
/// Falls back to copy+remove when the rename is refused.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = dest.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = tmp_sibling(dest);
    {
        let mut f = with_backoff(|| File::create(&tmp)).with_context(|| format!("create {}", tmp.display()))?;
        f.write_all(bytes).with_context(|| format!("write {}", tmp.display()))?;
        f.flush()?;
    }
    if with_backoff(|| fs::rename(&tmp, dest)).is_err() {
        with_backoff(|| fs::copy(&tmp, dest)).with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
        with_backoff(|| match fs::remove_file(&tmp) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        })
        .with_context(|| format!("remove {}", tmp.display()))?;
    }
    Ok(())
}

fn tmp_sibling(dest: &Path) -> PathBuf {
    let name = dest.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "out".into());
    dest.with_file_name(format!(".{name}.tmp"))
}
