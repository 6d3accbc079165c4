//! `rangeseek probe <url>` – show what the probe request learned.

use anyhow::Result;
use rangeseek_core::config::RangeseekConfig;
use rangeseek_core::probe::Validator;
use serde::Serialize;

use super::open_channel;

const PREVIEW_BYTES: usize = 32;

#[derive(Debug, Serialize)]
struct ProbeReport {
    url: String,
    size: u64,
    validator: String,
    validator_kind: &'static str,
    requests: u64,
    head_len: usize,
    head_hex: String,
}

pub fn run_probe(cfg: &RangeseekConfig, url: &str, json: bool) -> Result<()> {
    let mut ch = open_channel(cfg, url, None)?;
    let report = ProbeReport {
        url: ch.url().to_string(),
        size: ch.size(),
        validator: ch.validator().to_string(),
        validator_kind: match ch.validator() {
            Validator::EntityTag(_) => "etag",
            Validator::LastModified(_) => "last-modified",
        },
        requests: ch.request_count(),
        head_len: ch.head_bytes().len(),
        head_hex: hex::encode(ch.head_bytes()),
    };
    ch.close();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("URL:        {}", report.url);
    println!("Size:       {} bytes", report.size);
    println!("Validator:  {} ({})", report.validator, report.validator_kind);
    println!("Requests:   {}", report.requests);
    let preview = &report.head_hex[..report.head_hex.len().min(PREVIEW_BYTES * 2)];
    println!("Head:       {} ({} bytes captured)", preview, report.head_len);
    Ok(())
}
