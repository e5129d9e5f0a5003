use midair_driver::{
    cpu::{RxDatagram, TxDatagram},
    error::DriverError,
    geometry::Geometry,
    link::Link,
};

/// Fan several links out as one: `send` goes to every adapter, `receive`
/// reads the first.
pub struct Bundle {
    links: Vec<Box<dyn Link>>,
}

impl Bundle {
    pub fn new(links: Vec<Box<dyn Link>>) -> Self {
        Self { links }
    }
}

impl Link for Bundle {
    fn open(&mut self, geometry: &Geometry) -> Result<(), DriverError> {
        self.links
            .iter_mut()
            .try_for_each(|link| link.open(geometry))
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.links.iter_mut().try_for_each(|link| link.close())
    }

    fn send(&mut self, tx: &TxDatagram) -> Result<bool, DriverError> {
        self.links
            .iter_mut()
            .try_fold(true, |acc, link| Ok(acc & link.send(tx)?))
    }

    fn receive(&mut self, rx: &mut RxDatagram) -> Result<bool, DriverError> {
        match self.links.first_mut() {
            Some(link) => link.receive(rx),
            None => Ok(false),
        }
    }

    fn is_open(&self) -> bool {
        !self.links.is_empty() && self.links.iter().all(|link| link.is_open())
    }
}
