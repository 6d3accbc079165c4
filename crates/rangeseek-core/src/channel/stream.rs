//! `std::io` adapters so a channel can be handed to anything taking `Read + Seek`.

use std::io::{self, Read, Seek, SeekFrom};

use super::SeekableHttpChannel;
use crate::transport::HttpTransport;

impl<T: HttpTransport> Read for SeekableHttpChannel<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(SeekableHttpChannel::read(self, buf)?)
    }
}

impl<T: HttpTransport> Seek for SeekableHttpChannel<T> {
    /// Same rules as `seek_to`: `SeekFrom::End(0)` is rejected unless the
    /// position is already at the end.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => i128::from(n),
            SeekFrom::Current(delta) => i128::from(self.position) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.size) + i128::from(delta),
        };
        let target = i64::try_from(target).unwrap_or(if target < 0 { i64::MIN } else { i64::MAX });
        self.seek_to(target)?;
        Ok(self.position)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }
}
