mod defined;
mod stm_focus;

pub use defined::*;
pub use stm_focus::*;
