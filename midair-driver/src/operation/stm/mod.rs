mod focus;
mod gain;

pub use focus::*;
pub use gain::*;
