pub mod config;
pub mod logging;

pub mod channel;
pub mod checksum;
pub mod error;
pub mod probe;
pub mod transport;

pub use channel::{ChannelOptions, SeekableHttpChannel, DEFAULT_SKIP_THRESHOLD};
pub use error::ChannelError;
pub use transport::curl::CurlTransport;
