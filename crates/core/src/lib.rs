pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod proxy;
pub mod registry;
pub mod rtp;
pub mod server;
pub mod stream;
pub mod transport;

pub use config::{StreamConfig, parse_streams};
pub use error::{ProxyError, Result};
pub use registry::StreamRegistry;
pub use server::Server;
