//! SHA-256 over a reader, used to fingerprint a byte range of a remote resource.

use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};

const BUF_SIZE: usize = 64 * 1024;

/// Digest of what was hashed, and how many bytes that was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeDigest {
    pub sha256: String,
    pub bytes: u64,
}

/// `Write` sink that hashes everything written to it.
#[derive(Default)]
pub struct Sha256Writer {
    hasher: Sha256,
    bytes: u64,
}

impl Sha256Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> RangeDigest {
        RangeDigest {
            sha256: hex::encode(self.hasher.finalize()),
            bytes: self.bytes,
        }
    }
}

impl Write for Sha256Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        self.bytes += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compute SHA-256 of at most `limit` bytes from `reader` (all of it when `None`)
/// and return the digest as lowercase hex. Reads in chunks to keep memory bounded.
pub fn sha256_reader<R: Read>(reader: &mut R, limit: Option<u64>) -> io::Result<RangeDigest> {
    let mut sink = Sha256Writer::new();
    let mut buf = vec![0u8; BUF_SIZE];
    let mut remaining = limit.unwrap_or(u64::MAX);
    while remaining > 0 {
        let want = usize::try_from(remaining).unwrap_or(BUF_SIZE).min(BUF_SIZE);
        let n = match reader.read(&mut buf[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sink.write_all(&buf[..n])?;
        remaining -= n as u64;
    }
    Ok(sink.finish())
}
