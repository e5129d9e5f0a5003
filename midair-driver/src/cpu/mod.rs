mod body;
mod datagram;
mod ec_config;
mod header;

pub use body::*;
pub use datagram::*;
pub use ec_config::*;
pub use header::*;
