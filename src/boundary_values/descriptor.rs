//! One iolet plus the channel attached to it on this rank.

use crate::algs::communicator::Communicator;
use crate::iolet_error::IoletError;
use crate::iolets::{BoundaryComms, Iolet, IoletCondition};

/// An initialised iolet and, iff the iolet is locally relevant, its channel.
#[derive(Debug)]
pub struct BoundaryDescriptor<C: Communicator> {
    index: usize,
    iolet: Iolet,
    comms: Option<BoundaryComms<C>>,
}

impl<C: Communicator> BoundaryDescriptor<C> {
    pub(crate) fn new(index: usize, iolet: Iolet, comms: Option<BoundaryComms<C>>) -> Self {
        Self {
            index,
            iolet,
            comms,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn iolet(&self) -> &Iolet {
        &self.iolet
    }

    pub(crate) fn iolet_mut(&mut self) -> &mut Iolet {
        &mut self.iolet
    }

    pub fn comms(&self) -> Option<&BoundaryComms<C>> {
        self.comms.as_ref()
    }

    pub fn requires_comms(&self) -> bool {
        self.iolet.requires_comms()
    }

    fn comms_mut(&mut self) -> Result<&mut BoundaryComms<C>, IoletError> {
        self.comms
            .as_mut()
            .ok_or(IoletError::MissingComms { iolet: self.index })
    }

    /// Start this step's exchange for `zero_step`.
    pub(crate) fn issue(&mut self, comm: &C, zero_step: u64) -> Result<(), IoletError> {
        let density = self.iolet.density(zero_step);
        self.comms_mut()?.issue(comm, zero_step, density)
    }

    pub(crate) fn finish_send(&mut self) -> Result<(), IoletError> {
        self.comms_mut()?.finish_send();
        Ok(())
    }

    /// Wait for the pending receive and hand its value to the iolet.
    pub(crate) fn finish_receive(&mut self) -> Result<(), IoletError> {
        if let Some(wire) = self.comms_mut()?.wait()? {
            self.iolet.accept_density(wire.step(), wire.density());
        }
        Ok(())
    }

    /// Forget a failed receive on the channel, if there is one.
    pub(crate) fn discard_failure(&mut self) {
        if let Some(comms) = self.comms.as_mut() {
            comms.discard_failure();
        }
    }

    /// Complete everything outstanding on the channel, if there is one.
    pub(crate) fn drain(&mut self) -> Result<(), IoletError> {
        if self.comms.is_none() {
            return Ok(());
        }
        self.finish_send()?;
        self.finish_receive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;
    use crate::iolets::MultiscalePressureIolet;
    use crate::units::UnitConverter;

    fn unattached() -> BoundaryDescriptor<NoComm> {
        let mut iolet: Iolet = MultiscalePressureIolet::new(80.0, 60.0, 100.0).into();
        iolet.initialise(&UnitConverter::default()).unwrap();
        BoundaryDescriptor::new(0, iolet, None)
    }

    #[test]
    fn comms_operations_without_channel_fail_fast() {
        let mut d = unattached();
        assert!(d.requires_comms());
        assert!(matches!(
            d.issue(&NoComm, 0),
            Err(IoletError::MissingComms { iolet: 0 })
        ));
        assert!(matches!(
            d.finish_send(),
            Err(IoletError::MissingComms { iolet: 0 })
        ));
        assert!(matches!(
            d.finish_receive(),
            Err(IoletError::MissingComms { iolet: 0 })
        ));
    }

    #[test]
    fn drain_without_channel_is_a_no_op() {
        let mut d = unattached();
        d.discard_failure();
        d.drain().unwrap();
        assert!(d.comms().is_none());
    }
}
