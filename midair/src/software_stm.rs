use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use midair_driver::{defined::float, error::DriverError, link::Link};

use crate::{gain::Gain, Controller};

/// How the worker waits out the remainder of each period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimerStrategy {
    /// `std::thread::sleep` for the remainder.
    #[default]
    Sleep,
    /// Spin until the deadline.
    BusyWait,
    /// Hybrid sleep/spin timer with sub-millisecond accuracy.
    NativeTimer,
}

/// Host-timed spatio-temporal modulation: a worker thread sends one gain
/// after another at a fixed period. The controller is moved into the
/// worker by [`SoftwareSTM::start`] and handed back by
/// [`SoftwareSTMThreadHandle::finish`].
pub struct SoftwareSTM {
    gains: Vec<Box<dyn Gain + Send>>,
    sample_period_ns: u64,
    pub timer_strategy: TimerStrategy,
}

impl SoftwareSTM {
    pub fn new() -> Self {
        Self {
            gains: Vec::new(),
            sample_period_ns: 0,
            timer_strategy: TimerStrategy::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.gains.len()
    }

    pub fn add<G: Gain + Send + 'static>(&mut self, gain: G) {
        self.gains.push(Box::new(gain));
    }

    /// Set the repetition frequency of the whole sequence; the sampling
    /// period is rounded to nanoseconds and the actual frequency returned.
    pub fn set_frequency(&mut self, freq: float) -> float {
        let sample_freq = self.size() as float * freq;
        self.sample_period_ns = (1_000_000_000.0 / sample_freq).round() as u64;
        self.frequency()
    }

    pub fn frequency(&self) -> float {
        self.sampling_frequency() / self.size() as float
    }

    pub fn period(&self) -> u64 {
        self.sample_period_ns * self.size() as u64
    }

    pub fn sampling_frequency(&self) -> float {
        1_000_000_000.0 / self.sample_period_ns as float
    }

    pub fn sampling_period_ns(&self) -> u64 {
        self.sample_period_ns
    }

    pub fn set_sampling_period_ns(&mut self, period_ns: u64) {
        self.sample_period_ns = period_ns;
    }

    /// Consume the controller and start pumping gains from a worker
    /// thread.
    pub fn start<L: Link + 'static>(self, cnt: Controller<L>) -> SoftwareSTMThreadHandle<L> {
        let run = Arc::new(AtomicBool::new(true));
        let strategy = self.timer_strategy;
        let period = Duration::from_nanos(self.sample_period_ns);
        let mut gains = self.gains;
        let mut cnt = cnt;

        let run_th = Arc::clone(&run);
        let th = std::thread::spawn(move || {
            let sleeper = spin_sleep::SpinSleeper::default();
            let mut next = Instant::now() + period;
            let mut i = 0;
            while run_th.load(Ordering::Acquire) {
                if !gains.is_empty() {
                    if let Err(e) = cnt.send_body(&mut gains[i]) {
                        tracing::error!("SoftwareSTM send failed: {}", e);
                    }
                    i = (i + 1) % gains.len();
                }
                match strategy {
                    TimerStrategy::Sleep => {
                        let now = Instant::now();
                        if next > now {
                            std::thread::sleep(next - now);
                        }
                    }
                    TimerStrategy::BusyWait => {
                        while Instant::now() < next {
                            std::hint::spin_loop();
                        }
                    }
                    TimerStrategy::NativeTimer => {
                        let now = Instant::now();
                        if next > now {
                            sleeper.sleep(next - now);
                        }
                    }
                }
                next += period;
            }
            cnt
        });

        SoftwareSTMThreadHandle { run, th }
    }
}

impl Default for SoftwareSTM {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SoftwareSTMThreadHandle<L: Link> {
    run: Arc<AtomicBool>,
    th: JoinHandle<Controller<L>>,
}

impl<L: Link> SoftwareSTMThreadHandle<L> {
    /// Stop the worker after its current cycle and hand the controller
    /// back.
    pub fn finish(self) -> Result<Controller<L>, DriverError> {
        self.run.store(false, Ordering::Release);
        self.th
            .join()
            .map_err(|_| DriverError::LinkError("SoftwareSTM worker panicked".to_string()))
    }
}
