//! The sender contract.

use cadence_errors::SenderResult;

use crate::packet::PacketList;

/// A transport that accepts packet lists without blocking the caller.
///
/// `send` only posts work; transmission happens elsewhere and completion is
/// observed through [`is_send_done`](Sender::is_send_done). Failing calls
/// also record their message in the sender's sticky error slot.
pub trait Sender: Send {
    /// Prepare the transport. Calling it again first tears down the previous
    /// session.
    ///
    /// # Errors
    ///
    /// Fails if the transport cannot be brought up.
    fn initialize(&mut self) -> SenderResult;

    /// Post `list` for transmission and return immediately.
    ///
    /// # Errors
    ///
    /// Fails if not initialized, if the previous list is still in flight, or
    /// if the transport has failed since the last call.
    fn send(&mut self, list: PacketList) -> SenderResult;

    /// Whether the last posted list has been fully transmitted.
    fn is_send_done(&self) -> bool;

    /// Tear down the transport. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Implementations report teardown failures here; the TCP sender never
    /// fails.
    fn end(&mut self) -> SenderResult;

    /// Drain the last recorded error message.
    fn take_error(&mut self) -> Option<String>;

    /// Whether an error message is waiting to be drained.
    fn is_error(&self) -> bool;
}

impl<S: Sender + ?Sized> Sender for Box<S> {
    fn initialize(&mut self) -> SenderResult {
        (**self).initialize()
    }

    fn send(&mut self, list: PacketList) -> SenderResult {
        (**self).send(list)
    }

    fn is_send_done(&self) -> bool {
        (**self).is_send_done()
    }

    fn end(&mut self) -> SenderResult {
        (**self).end()
    }

    fn take_error(&mut self) -> Option<String> {
        (**self).take_error()
    }

    fn is_error(&self) -> bool {
        (**self).is_error()
    }
}
