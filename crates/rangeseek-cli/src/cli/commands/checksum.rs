//! `rangeseek checksum <url>` – SHA-256 of a byte range.

use anyhow::{Context, Result};
use rangeseek_core::checksum::Sha256Writer;
use rangeseek_core::config::RangeseekConfig;

use super::{copy_range, open_range, RangeArgs};

pub fn run_checksum(cfg: &RangeseekConfig, args: &RangeArgs) -> Result<()> {
    let (mut ch, length) = open_range(cfg, args)?;
    let mut sink = Sha256Writer::new();
    copy_range(&mut ch, length, &mut sink).with_context(|| format!("hash {}", args.url))?;
    let digest = sink.finish();
    println!("{}  {} [{}+{}]", digest.sha256, args.url, args.offset, digest.bytes);
    tracing::debug!(requests = ch.request_count(), "checksum finished");
    ch.close();
    Ok(())
}
