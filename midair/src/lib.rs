pub mod controller;
pub mod datagram;
pub mod gain;
pub mod link;
pub mod modulation;
pub mod prelude;
pub mod software_stm;
pub mod stm;

pub use midair_driver as driver;

pub use controller::Controller;
pub use software_stm::SoftwareSTM;
