//! The `Node`: peer table, application dispatch, and pending-request
//! correlation that sits above the raw transport and peer state machine.

use crate::avp;
use crate::avp::identity::IdentityAvp;
use crate::avp::unsigned32::Unsigned32Avp;
use crate::commands::cea::CapabilitiesExchangeAnswer;
use crate::commands::cer::CapabilitiesExchangeRequest;
use crate::commands::codes;
use crate::commands::dpa::DisconnectPeerAnswer;
use crate::commands::dpr::DisconnectPeerRequest;
use crate::commands::dwa::DeviceWatchdogAnswer;
use crate::commands::dwr::DeviceWatchdogRequest;
use crate::config::NodeSettings;
use crate::dictionary::Dictionary;
use crate::error::{DisconnectReason, Error, Result};
use crate::message::{command_codes, DiameterMessage};
use crate::peer::{transition, PeerConnection, PeerEvent, PeerState};
use crate::result_code::{DIAMETER_APPLICATION_UNSUPPORTED, DIAMETER_SUCCESS};
use crate::session::SequenceGenerator;
use crate::transport::Codec;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{split, AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::oneshot;
use tokio::sync::Mutex;
use tokio::time::{self, Duration};

/// An application-layer handler: given an inbound request, produce the answer.
pub type ApplicationHandler = Arc<
    dyn Fn(DiameterMessage) -> Pin<Box<dyn Future<Output = Result<DiameterMessage>> + Send>>
        + Send
        + Sync,
>;

struct PendingRequest {
    reply: oneshot::Sender<DiameterMessage>,
}

/// The writable half of an established, handshaken peer connection, returned
/// by [`Node::handshake`]/[`Node::accept`] for the caller to drive outbound
/// traffic through. Also exposes the live [`PeerState`] and, once the
/// connection has closed, the [`DisconnectReason`] the read loop recorded.
pub struct PeerWriter<S> {
    writer: Arc<Mutex<WriteHalf<S>>>,
    state: Arc<Mutex<PeerState>>,
    reason: Arc<Mutex<Option<DisconnectReason>>>,
}

impl<S> Clone for PeerWriter<S> {
    fn clone(&self) -> PeerWriter<S> {
        PeerWriter {
            writer: Arc::clone(&self.writer),
            state: Arc::clone(&self.state),
            reason: Arc::clone(&self.reason),
        }
    }
}

impl<S> PeerWriter<S> {
    pub async fn state(&self) -> PeerState {
        *self.state.lock().await
    }

    pub async fn disconnect_reason(&self) -> Option<DisconnectReason> {
        *self.reason.lock().await
    }
}

/// A local Diameter node: owns identity/config, an application-id to handler
/// registry, and the pending-request table used to correlate answers with
/// the request that triggered them.
///
/// This plays the role `DiameterClient`/`DiameterServer` each play alone, but
/// combined into a single peer that both originates and answers requests, the
/// way RFC 6733 describes a Diameter node rather than a fixed client/server
/// role.
pub struct Node {
    settings: NodeSettings,
    dict: Arc<Dictionary>,
    seq: SequenceGenerator,
    applications: HashMap<u32, ApplicationHandler>,
    pending: Arc<Mutex<HashMap<u32, PendingRequest>>>,
}

impl Node {
    pub fn new(settings: NodeSettings, dict: Arc<Dictionary>) -> Node {
        Node {
            settings,
            dict,
            seq: SequenceGenerator::new(),
            applications: HashMap::new(),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers the handler invoked for inbound requests of `application_id`.
    pub fn register_application(&mut self, application_id: u32, handler: ApplicationHandler) {
        self.applications.insert(application_id, handler);
    }

    fn next_ids(&self) -> (u32, u32) {
        (self.seq.next(), self.seq.next())
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dict
    }

    fn cer(settings: &NodeSettings) -> CapabilitiesExchangeRequest {
        CapabilitiesExchangeRequest {
            origin_host: settings.origin_host.clone(),
            origin_realm: settings.origin_realm.clone(),
            host_ip_addresses: vec![],
            vendor_id: settings.vendor_id,
            product_name: settings.product_name.clone(),
            origin_state_id: None,
            supported_vendor_ids: settings.supported_vendor_ids.clone(),
            auth_application_ids: settings.auth_application_ids.clone(),
            acct_application_ids: settings.acct_application_ids.clone(),
            vendor_specific_application_id: None,
            additional_avps: vec![],
        }
    }

    fn cea(settings: &NodeSettings) -> CapabilitiesExchangeAnswer {
        CapabilitiesExchangeAnswer {
            result_code: DIAMETER_SUCCESS,
            origin_host: settings.origin_host.clone(),
            origin_realm: settings.origin_realm.clone(),
            host_ip_addresses: vec![],
            vendor_id: settings.vendor_id,
            product_name: settings.product_name.clone(),
            auth_application_ids: settings.auth_application_ids.clone(),
            acct_application_ids: settings.acct_application_ids.clone(),
            vendor_specific_application_id: None,
            additional_avps: vec![],
        }
    }

    /// Performs the CER/CEA exchange over an already-connected stream, then
    /// splits it and spawns a background read loop (watchdog/disconnect
    /// handling, application dispatch, answer correlation). Returns a
    /// [`PeerWriter`] the caller uses to send further requests and to watch
    /// connection state.
    pub async fn handshake<S>(node: Arc<Mutex<Node>>, stream: S) -> Result<PeerWriter<S>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut reader, mut writer): (ReadHalf<S>, WriteHalf<S>) = split(stream);

        let (dict, settings, hop_by_hop, end_to_end) = {
            let n = node.lock().await;
            let (h, e) = n.next_ids();
            (Arc::clone(&n.dict), n.settings.clone(), h, e)
        };

        let req = Self::cer(&settings).build(hop_by_hop, end_to_end, Arc::clone(&dict));
        Codec::encode(&mut writer, &req).await?;

        let answer = match time::timeout(
            settings.cea_timeout,
            Codec::decode(&mut reader, Arc::clone(&dict)),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                log::error!("timed out waiting for CEA ({:?})", DisconnectReason::FailedConnectCE);
                return Err(Error::Timeout);
            }
        };
        if answer.get_command_code() != command_codes::CAPABILITIES_EXCHANGE {
            log::error!("{:?}", DisconnectReason::FailedConnectCE);
            return Err(Error::ServerError(
                "peer did not answer CER with a CEA".into(),
            ));
        }
        let cea = CapabilitiesExchangeAnswer::from_message(&answer)?;
        if cea.result_code != DIAMETER_SUCCESS {
            log::error!("{:?}", DisconnectReason::CerRejected);
            return Err(Error::ServerError(format!(
                "peer rejected capabilities exchange: {}",
                cea.result_code
            )));
        }

        let mut peer_state = transition(PeerState::Connecting, PeerEvent::SendCer)?;
        peer_state = transition(peer_state, PeerEvent::RecvCea)?;
        let state = Arc::new(Mutex::new(peer_state));
        let reason = Arc::new(Mutex::new(None));

        let pending = Arc::clone(&node.lock().await.pending);
        let writer = Arc::new(Mutex::new(writer));
        tokio::spawn(Node::read_loop(
            node,
            reader,
            Arc::clone(&writer),
            Arc::clone(&state),
            Arc::clone(&reason),
            dict,
            pending,
        ));

        Ok(PeerWriter {
            writer,
            state,
            reason,
        })
    }

    /// The responder side of [`Node::handshake`]: waits for the peer to open
    /// with a CER, answers with a CEA built from this node's settings, and
    /// spawns the same read loop. Used by an inbound listener once a
    /// connection is accepted.
    pub async fn accept<S>(node: Arc<Mutex<Node>>, stream: S) -> Result<PeerWriter<S>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (mut reader, mut writer): (ReadHalf<S>, WriteHalf<S>) = split(stream);

        let (dict, settings) = {
            let n = node.lock().await;
            (Arc::clone(&n.dict), n.settings.clone())
        };

        let req = Codec::decode(&mut reader, Arc::clone(&dict)).await?;
        if !req.is_request() || req.get_command_code() != command_codes::CAPABILITIES_EXCHANGE {
            log::error!("{:?}: first inbound message was not a CER", DisconnectReason::CerRejected);
            return Err(Error::ServerError(
                "expected a CER as the first inbound message".into(),
            ));
        }
        // Parsed only to validate the peer's CER is well-formed before answering.
        CapabilitiesExchangeRequest::from_message(&req)?;

        let mut ans = req.new_answer();
        Self::cea(&settings).apply(&mut ans);
        Codec::encode(&mut writer, &ans).await?;

        let mut peer_state = transition(PeerState::Connecting, PeerEvent::RecvCer)?;
        peer_state = transition(peer_state, PeerEvent::SendCea)?;
        let state = Arc::new(Mutex::new(peer_state));
        let reason = Arc::new(Mutex::new(None));

        let pending = Arc::clone(&node.lock().await.pending);
        let writer = Arc::new(Mutex::new(writer));
        tokio::spawn(Node::read_loop(
            node,
            reader,
            Arc::clone(&writer),
            Arc::clone(&state),
            Arc::clone(&reason),
            dict,
            pending,
        ));

        Ok(PeerWriter {
            writer,
            state,
            reason,
        })
    }

    /// Dispatches one decoded inbound message: answers are routed to their
    /// pending request, requests go to the registered application handler.
    /// An application-id with no registered handler gets a
    /// `DIAMETER_APPLICATION_UNSUPPORTED` answer rather than being dropped
    /// (RFC 6733 §7.1.1). Device-Watchdog-Request and Disconnect-Peer-Request
    /// are base-protocol commands handled directly by the read loop and
    /// never reach this function.
    async fn dispatch(
        node: &Arc<Mutex<Node>>,
        msg: DiameterMessage,
        pending: &Arc<Mutex<HashMap<u32, PendingRequest>>>,
    ) -> Result<Option<DiameterMessage>> {
        if !msg.is_request() {
            let hop_by_hop = msg.get_hop_by_hop_id();
            let mut table = pending.lock().await;
            if let Some(req) = table.remove(&hop_by_hop) {
                let _ = req.reply.send(msg);
            }
            return Ok(None);
        }

        let handler = {
            let n = node.lock().await;
            n.applications.get(&msg.get_application_id()).cloned()
        };
        match handler {
            Some(handler) => Ok(Some(handler(msg).await?)),
            None => {
                let n = node.lock().await;
                let mut ans = msg.new_answer();
                ans.add_avp(avp!(
                    codes::RESULT_CODE,
                    None,
                    Unsigned32Avp::new(DIAMETER_APPLICATION_UNSUPPORTED),
                    true
                ));
                ans.add_avp(avp!(
                    codes::ORIGIN_HOST,
                    None,
                    IdentityAvp::new(&n.settings.origin_host),
                    true
                ));
                ans.add_avp(avp!(
                    codes::ORIGIN_REALM,
                    None,
                    IdentityAvp::new(&n.settings.origin_realm),
                    true
                ));
                Ok(Some(ans))
            }
        }
    }

    /// Drives one peer connection after a successful handshake: reads
    /// messages, answers Device-Watchdog-Request and Disconnect-Peer-Request
    /// inline, hands everything else to [`Node::dispatch`], and writes
    /// whatever answer comes back through the shared `writer`. Races each
    /// read against the idle timer (send a DWR) and, once one is in flight,
    /// the DWA timer (force the connection closed), recording a
    /// [`DisconnectReason`] whenever it exits.
    async fn read_loop<S>(
        node: Arc<Mutex<Node>>,
        reader: ReadHalf<S>,
        writer: Arc<Mutex<WriteHalf<S>>>,
        state: Arc<Mutex<PeerState>>,
        reason: Arc<Mutex<Option<DisconnectReason>>>,
        dict: Arc<Dictionary>,
        pending: Arc<Mutex<HashMap<u32, PendingRequest>>>,
    ) where
        S: AsyncWrite + Unpin + Send,
    {
        let mut conn = PeerConnection::new(reader);
        let (watchdog_interval, dwa_timeout) = {
            let n = node.lock().await;
            (n.settings.watchdog_interval, n.settings.dwa_timeout)
        };

        loop {
            let current = *state.lock().await;
            let budget = if current == PeerState::ReadyWaitingDwa {
                dwa_timeout
            } else {
                watchdog_interval.saturating_sub(conn.idle_for())
            };

            tokio::select! {
                result = conn.recv(Arc::clone(&dict)) => {
                    let msg = match result {
                        Ok(msg) => msg,
                        Err(e) => {
                            log::error!("peer read loop ending: {:?}", e);
                            *reason.lock().await = Some(DisconnectReason::SocketFail);
                            *state.lock().await = PeerState::Closed;
                            return;
                        }
                    };

                    if msg.get_command_code() == command_codes::DEVICE_WATCHDOG && !msg.is_request() {
                        let s = *state.lock().await;
                        match transition(s, PeerEvent::RecvDwa) {
                            Ok(next) => *state.lock().await = next,
                            Err(e) => log::error!("unexpected DWA: {:?}", e),
                        }
                        continue;
                    }

                    if msg.get_command_code() == command_codes::DEVICE_WATCHDOG && msg.is_request() {
                        let dwr = match DeviceWatchdogRequest::from_message(&msg) {
                            Ok(dwr) => dwr,
                            Err(e) => {
                                log::error!("malformed DWR: {:?}", e);
                                continue;
                            }
                        };
                        let s = *state.lock().await;
                        if let Err(e) = transition(s, PeerEvent::RecvDwr) {
                            log::error!("unexpected DWR: {:?}", e);
                            continue;
                        }

                        let origin = {
                            let n = node.lock().await;
                            (n.settings.origin_host.clone(), n.settings.origin_realm.clone())
                        };
                        let mut ans = msg.new_answer();
                        DeviceWatchdogAnswer {
                            result_code: DIAMETER_SUCCESS,
                            origin_host: origin.0,
                            origin_realm: origin.1,
                            origin_state_id: dwr.origin_state_id,
                            additional_avps: vec![],
                        }
                        .apply(&mut ans);

                        let sent = {
                            let mut w = writer.lock().await;
                            Codec::encode(&mut *w, &ans).await
                        };
                        if let Err(e) = sent {
                            log::error!("failed to send DWA: {:?}", e);
                            *reason.lock().await = Some(DisconnectReason::SocketFail);
                            *state.lock().await = PeerState::Closed;
                            return;
                        }
                        continue;
                    }

                    if msg.get_command_code() == command_codes::DISCONNECT_PEER && msg.is_request() {
                        if let Err(e) = DisconnectPeerRequest::from_message(&msg) {
                            log::error!("malformed DPR: {:?}", e);
                            continue;
                        }
                        let s = *state.lock().await;
                        match transition(s, PeerEvent::RecvDpr) {
                            Ok(next) => *state.lock().await = next,
                            Err(e) => {
                                log::error!("unexpected DPR: {:?}", e);
                                continue;
                            }
                        }

                        let origin = {
                            let n = node.lock().await;
                            (n.settings.origin_host.clone(), n.settings.origin_realm.clone())
                        };
                        let mut ans = msg.new_answer();
                        DisconnectPeerAnswer {
                            result_code: DIAMETER_SUCCESS,
                            origin_host: origin.0,
                            origin_realm: origin.1,
                            additional_avps: vec![],
                        }
                        .apply(&mut ans);

                        let sent = {
                            let mut w = writer.lock().await;
                            Codec::encode(&mut *w, &ans).await
                        };
                        if let Err(e) = sent {
                            log::error!("failed to send DPA: {:?}", e);
                        }
                        *reason.lock().await = Some(DisconnectReason::CleanDisconnect);
                        if let Ok(next) = transition(*state.lock().await, PeerEvent::TransportDown) {
                            *state.lock().await = next;
                        }
                        return;
                    }

                    match Node::dispatch(&node, msg, &pending).await {
                        Ok(Some(answer)) => {
                            let sent = {
                                let mut w = writer.lock().await;
                                Codec::encode(&mut *w, &answer).await
                            };
                            if let Err(e) = sent {
                                log::error!("failed to send answer: {:?}", e);
                                *reason.lock().await = Some(DisconnectReason::SocketFail);
                                *state.lock().await = PeerState::Closed;
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => log::error!("dispatch error: {:?}", e),
                    }
                }
                _ = time::sleep(budget) => {
                    match current {
                        PeerState::ReadyWaitingDwa => {
                            log::warn!("DWA timeout, closing connection");
                            *reason.lock().await = Some(DisconnectReason::DwaTimeout);
                            if let Ok(next) = transition(current, PeerEvent::DwaTimeout) {
                                *state.lock().await = next;
                            }
                            return;
                        }
                        PeerState::Ready => {
                            let (hop, end, origin_host, origin_realm) = {
                                let n = node.lock().await;
                                let (h, e) = n.next_ids();
                                (h, e, n.settings.origin_host.clone(), n.settings.origin_realm.clone())
                            };
                            let dwr = DeviceWatchdogRequest {
                                origin_host,
                                origin_realm,
                                origin_state_id: None,
                                additional_avps: vec![],
                            };
                            let req = dwr.build(hop, end, Arc::clone(&dict));
                            let sent = {
                                let mut w = writer.lock().await;
                                Codec::encode(&mut *w, &req).await
                            };
                            match sent {
                                Ok(()) => {
                                    if let Ok(next) = transition(current, PeerEvent::SendDwr) {
                                        *state.lock().await = next;
                                    }
                                }
                                Err(e) => {
                                    log::error!("failed to send DWR: {:?}", e);
                                    *reason.lock().await = Some(DisconnectReason::SocketFail);
                                    *state.lock().await = PeerState::Closed;
                                    return;
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Sends `req` on `peer` and returns a future resolving to the correlated
    /// answer, timing out after `timeout`.
    pub async fn send_request<S>(
        &self,
        peer: &PeerWriter<S>,
        req: DiameterMessage,
        timeout: Duration,
    ) -> Result<DiameterMessage>
    where
        S: AsyncWrite + Unpin + Send,
    {
        let hop_by_hop = req.get_hop_by_hop_id();
        let (tx, rx) = oneshot::channel();
        {
            let mut table = self.pending.lock().await;
            table.insert(hop_by_hop, PendingRequest { reply: tx });
        }

        {
            let mut w = peer.writer.lock().await;
            Codec::encode(&mut *w, &req).await?;
        }

        match time::timeout(timeout, rx).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(_)) => Err(Error::PeerGone),
            Err(_) => {
                self.pending.lock().await.remove(&hop_by_hop);
                Err(Error::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary;

    #[tokio::test]
    async fn test_new_node_has_no_applications() {
        let dict = Arc::new(Dictionary::new(&[&dictionary::DEFAULT_DICT_XML]));
        let node = Node::new(NodeSettings::new("host.example.com", "example.com"), dict);
        assert!(node.applications.is_empty());
    }

    #[tokio::test]
    async fn test_register_application() {
        let dict = Arc::new(Dictionary::default());
        let mut node = Node::new(NodeSettings::new("host.example.com", "example.com"), dict);
        let handler: ApplicationHandler =
            Arc::new(|req| Box::pin(async move { Ok(req.new_answer()) }));
        node.register_application(4, handler);
        assert!(node.applications.contains_key(&4));
    }
}
