//! Diameter Protocol Server
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::message::DiameterMessage;
use crate::node::Node;
use crate::transport::Codec;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub struct DiameterServerConfig {
    pub native_tls: Option<native_tls::Identity>,
}

/// A Diameter protocol server for handling Diameter requests and responses.
///
/// This server listens for incoming Diameter messages, processes them, and sends back responses.
pub struct DiameterServer {
    listener: TcpListener,
    config: DiameterServerConfig,
}

impl DiameterServer {
    /// Creates a new `DiameterServer` and starts listening on the specified address.
    pub async fn new(addr: &str, config: DiameterServerConfig) -> Result<DiameterServer> {
        let listener = TcpListener::bind(addr).await?;
        Ok(DiameterServer { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Listens for incoming connections and processes Diameter messages.
    ///
    /// `handler` is invoked with each decoded request and must return the
    /// answer to send back. `dict` is shared across every accepted
    /// connection to decode and encode AVPs.
    pub async fn listen<F, Fut>(&mut self, handler: F, dict: Arc<Dictionary>) -> Result<()>
    where
        F: Fn(DiameterMessage) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<DiameterMessage>> + Send + 'static,
    {
        loop {
            match self.config.native_tls {
                Some(ref identity) => {
                    let acceptor = native_tls::TlsAcceptor::new(identity.clone())?;
                    let acceptor = tokio_native_tls::TlsAcceptor::from(acceptor);

                    let (stream, peer_addr) = self.listener.accept().await?;
                    let stream = acceptor.accept(stream).await.map_err(|e| {
                        crate::error::Error::ServerError(format!("TLS handshake failed: {}", e))
                    })?;

                    Self::handle_peer(peer_addr, stream, handler.clone(), Arc::clone(&dict));
                }
                None => {
                    let (stream, peer_addr) = self.listener.accept().await?;
                    Self::handle_peer(peer_addr, stream, handler.clone(), Arc::clone(&dict));
                }
            };
        }
    }

    /// Listens for incoming connections and hands each one to `node`'s
    /// CER/CEA handshake ([`Node::accept`]) and peer state machine, instead
    /// of the raw per-request `handler` closure `listen` uses. This is the
    /// entry point for an inbound Diameter node: the returned connection is
    /// driven entirely by `Node`'s background read loop (watchdog, disconnect,
    /// application dispatch), so nothing further needs to be done with it
    /// once the handshake succeeds.
    pub async fn listen_with_node(&mut self, node: Arc<Mutex<Node>>) -> Result<()> {
        loop {
            match self.config.native_tls {
                Some(ref identity) => {
                    let acceptor = native_tls::TlsAcceptor::new(identity.clone())?;
                    let acceptor = tokio_native_tls::TlsAcceptor::from(acceptor);

                    let (stream, peer_addr) = self.listener.accept().await?;
                    let stream = acceptor.accept(stream).await.map_err(|e| {
                        crate::error::Error::ServerError(format!("TLS handshake failed: {}", e))
                    })?;

                    Self::accept_peer(peer_addr, stream, Arc::clone(&node));
                }
                None => {
                    let (stream, peer_addr) = self.listener.accept().await?;
                    Self::accept_peer(peer_addr, stream, Arc::clone(&node));
                }
            };
        }
    }

    fn accept_peer<S>(peer_addr: SocketAddr, stream: S, node: Arc<Mutex<Node>>)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            log::info!("[{}] connection established", peer_addr);
            match Node::accept(node, stream).await {
                Ok(_peer) => log::info!("[{}] capabilities exchange complete", peer_addr),
                Err(e) => log::error!("[{}] handshake failed: {:?}", peer_addr, e),
            }
        });
    }

    fn handle_peer<F, Fut, S>(peer_addr: SocketAddr, stream: S, handler: F, dict: Arc<Dictionary>)
    where
        F: Fn(DiameterMessage) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<DiameterMessage>> + Send + 'static,
        S: AsyncReadExt + AsyncWriteExt + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            log::info!("[{}] Connection established", peer_addr);
            match Self::process_incoming_message(stream, handler, dict).await {
                Ok(_) => {
                    log::info!("[{}] Connection closed", peer_addr);
                }
                Err(e) => {
                    log::error!("[{}] Fatal error occurred: {:?}", peer_addr, e);
                }
            }
        });
    }

    async fn process_incoming_message<F, Fut, S>(
        mut stream: S,
        handler: F,
        dict: Arc<Dictionary>,
    ) -> Result<()>
    where
        F: Fn(DiameterMessage) -> Fut,
        Fut: Future<Output = Result<DiameterMessage>>,
        S: AsyncReadExt + AsyncWriteExt + Unpin,
    {
        loop {
            let req = match Codec::decode(&mut stream, Arc::clone(&dict)).await {
                Ok(req) => req,
                Err(e) => match e {
                    crate::error::Error::IoError(ref e)
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        return Ok(());
                    }
                    _ => {
                        return Err(e);
                    }
                },
            };

            let res = handler(req).await?;

            Codec::encode(&mut stream, &res).await?;
        }
    }
}
