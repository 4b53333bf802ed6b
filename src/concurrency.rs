//! Bounded parallelism across monthly dump files.

use crate::dumps::DumpFile;
use anyhow::Result;
use rayon::prelude::*;

/// Run `f` over `files` with at most `limit` decoders in flight.
pub fn for_each_dump_limited<F>(files: &[DumpFile], limit: usize, f: F) -> Result<()>
where
    F: Sync + Fn(&DumpFile) -> Result<()>,
{
    if limit <= 1 {
        return files.iter().try_for_each(&f);
    }
    for chunk in files.chunks(limit) {
        chunk.par_iter().try_for_each(&f)?;
    }
    Ok(())
}
