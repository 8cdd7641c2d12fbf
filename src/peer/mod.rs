//! The peer state machine (RFC 6733 §5.6), and the connection that drives it.

pub mod uri;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::message::DiameterMessage;
use crate::transport::Codec;
use std::fmt;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::time::{Duration, Instant};

/// Where a peer connection sits in the Capabilities-Exchange / Device-Watchdog
/// lifecycle. Transitions are driven purely by [`transition`] so the table is
/// testable without a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Connecting,
    Connected,
    Ready,
    ReadyWaitingDwa,
    Disconnecting,
    Closing,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerEvent {
    TransportUp,
    TransportDown,
    RecvCer,
    RecvCea,
    SendCer,
    SendCea,
    RecvDwr,
    RecvDwa,
    SendDwr,
    IdleTimeout,
    DwaTimeout,
    RecvDpr,
    RecvDpa,
    SendDpr,
    LocalDisconnect,
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The pure state-transition function. Returns `Err` for an event that is
/// not valid in the given state rather than silently staying put, so a
/// caller can tell a protocol violation from a no-op.
pub fn transition(state: PeerState, event: PeerEvent) -> Result<PeerState> {
    use PeerEvent::*;
    use PeerState::*;

    match (state, event) {
        (Closed, TransportUp) => Ok(Connecting),

        // Connecting: either side may open with CER, the other answers with CEA.
        (Connecting, SendCer) => Ok(Connecting),
        (Connecting, RecvCer) => Ok(Connecting),
        (Connecting, SendCea) => Ok(Ready),
        (Connecting, RecvCea) => Ok(Ready),
        (Connecting, TransportDown) => Ok(Closed),

        (Connected, RecvCer) => Ok(Connecting),
        (Connected, TransportDown) => Ok(Closed),

        // Ready: steady state, watchdog keeps the link alive.
        (Ready, SendDwr) => Ok(ReadyWaitingDwa),
        (Ready, RecvDwr) => Ok(Ready),
        (Ready, RecvDpr) => Ok(Disconnecting),
        (Ready, LocalDisconnect) => Ok(Closing),
        (Ready, TransportDown) => Ok(Closed),

        (ReadyWaitingDwa, RecvDwa) => Ok(Ready),
        (ReadyWaitingDwa, RecvDwr) => Ok(ReadyWaitingDwa),
        (ReadyWaitingDwa, DwaTimeout) => Ok(Closing),
        (ReadyWaitingDwa, RecvDpr) => Ok(Disconnecting),
        (ReadyWaitingDwa, TransportDown) => Ok(Closed),

        // A peer that asked us to disconnect is waiting on our DPA, then the
        // transport close; one that we asked is waiting on its own DPA.
        (Disconnecting, SendDpr) => Ok(Disconnecting),
        (Disconnecting, RecvDpa) => Ok(Closing),
        (Disconnecting, TransportDown) => Ok(Closed),

        (Closing, TransportDown) => Ok(Closed),

        (s, IdleTimeout) if s == Ready || s == ReadyWaitingDwa => Ok(s),

        (s, e) => Err(Error::ServerError(format!(
            "invalid peer event {:?} in state {:?}",
            e, s
        ))),
    }
}

/// Owns the read half of a peer connection and its last-activity clock, so a
/// read loop can race [`PeerConnection::recv`] against idle/DWA timers with
/// `tokio::select!` instead of polling. Framing and codec work is delegated
/// to [`Codec`].
pub struct PeerConnection<R> {
    reader: R,
    last_activity: Instant,
}

impl<R> PeerConnection<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> PeerConnection<R> {
        PeerConnection {
            reader,
            last_activity: Instant::now(),
        }
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Reads one message, resetting the idle clock on success. A transport
    /// error leaves the clock untouched since the connection is about to be
    /// torn down anyway.
    pub async fn recv(&mut self, dict: Arc<Dictionary>) -> Result<DiameterMessage> {
        let msg = Codec::decode(&mut self.reader, dict).await?;
        self.last_activity = Instant::now();
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PeerEvent::*;
    use PeerState::*;

    #[test]
    fn test_happy_path_to_ready() {
        let mut state = Closed;
        state = transition(state, TransportUp).unwrap();
        assert_eq!(state, Connecting);
        state = transition(state, SendCer).unwrap();
        assert_eq!(state, Connecting);
        state = transition(state, RecvCea).unwrap();
        assert_eq!(state, Ready);
    }

    #[test]
    fn test_watchdog_roundtrip() {
        let mut state = Ready;
        state = transition(state, SendDwr).unwrap();
        assert_eq!(state, ReadyWaitingDwa);
        state = transition(state, RecvDwa).unwrap();
        assert_eq!(state, Ready);
    }

    #[test]
    fn test_dwa_timeout_closes_connection() {
        let mut state = Ready;
        state = transition(state, SendDwr).unwrap();
        state = transition(state, DwaTimeout).unwrap();
        assert_eq!(state, Closing);
    }

    #[test]
    fn test_peer_initiated_disconnect() {
        let mut state = Ready;
        state = transition(state, RecvDpr).unwrap();
        assert_eq!(state, Disconnecting);
        state = transition(state, RecvDpa).unwrap();
        assert_eq!(state, Closing);
        state = transition(state, TransportDown).unwrap();
        assert_eq!(state, Closed);
    }

    #[test]
    fn test_invalid_event_is_rejected() {
        assert!(transition(Closed, RecvDwr).is_err());
    }
}
