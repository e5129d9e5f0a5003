mod bundle;
mod debug;

pub use bundle::*;
pub use debug::*;
