pub use crate::{
    controller::Controller,
    datagram::{
        Amplitudes, Clear, DatagramBody, DatagramHeader, ModDelayConfig, NullBody, NullHeader,
        SilencerConfig, Synchronize,
    },
    gain::{BesselBeam, Focus, Gain, Grouped, Null, PlaneWave, TransducerTest},
    modulation::{Modulation, Sine, SineLegacy, SineSquared, Square, Static},
    software_stm::{SoftwareSTM, TimerStrategy},
    stm::{FocusSTM, GainSTM, STM},
};

pub use midair_driver::{
    defined::float,
    error::DriverError,
    geometry::{Geometry, Vector3},
    link::Link,
    mode::Mode,
    operation::GainSTMMode,
};
