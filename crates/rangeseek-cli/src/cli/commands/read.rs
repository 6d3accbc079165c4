//! `rangeseek read <url>` – copy a byte range to stdout.

use anyhow::Result;
use rangeseek_core::config::RangeseekConfig;
use std::io::{self, Write};

use super::{copy_range, open_range, RangeArgs};

pub fn run_read(cfg: &RangeseekConfig, args: &RangeArgs) -> Result<()> {
    let (mut ch, length) = open_range(cfg, args)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let copied = copy_range(&mut ch, length, &mut out)?;
    out.flush()?;
    tracing::debug!(copied, requests = ch.request_count(), "read finished");
    ch.close();
    Ok(())
}
