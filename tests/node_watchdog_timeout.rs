use diameter::commands::cea::CapabilitiesExchangeAnswer;
use diameter::config::NodeSettings;
use diameter::dictionary::{self, Dictionary};
use diameter::error::DisconnectReason;
use diameter::message::DiameterMessage;
use diameter::node::Node;
use diameter::peer::PeerState;
use diameter::result_code::DIAMETER_SUCCESS;
use diameter::transport::Codec;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::time::Duration;

fn dict() -> Arc<Dictionary> {
    Arc::new(Dictionary::new(&[&dictionary::DEFAULT_DICT_XML]))
}

fn cea_answer(cer: &DiameterMessage) -> DiameterMessage {
    let mut ans = cer.new_answer();
    CapabilitiesExchangeAnswer {
        result_code: DIAMETER_SUCCESS,
        origin_host: "server.example.com".into(),
        origin_realm: "example.com".into(),
        host_ip_addresses: vec![],
        vendor_id: 0,
        product_name: "diameter-rs".into(),
        auth_application_ids: vec![4],
        acct_application_ids: vec![],
        vendor_specific_application_id: None,
        additional_avps: vec![],
    }
    .apply(&mut ans);
    ans
}

/// With idleTimeout=0 and dwaTimeout=100ms, a peer that answers the CER but
/// never answers the Device-Watchdog-Request that follows must see the
/// connection move Ready -> ReadyWaitingDwa -> Closing, recording
/// `DisconnectReason::DwaTimeout`.
#[tokio::test]
async fn test_dwa_timeout_closes_the_connection() {
    let dict = dict();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let peer_dict = Arc::clone(&dict);
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let cer = Codec::decode(&mut stream, Arc::clone(&peer_dict)).await.unwrap();
        Codec::encode(&mut stream, &cea_answer(&cer)).await.unwrap();

        // Read the DWR that the idle timer fires, but never answer it.
        let _dwr = Codec::decode(&mut stream, Arc::clone(&peer_dict)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let stream = TcpStream::connect(addr).await.unwrap();
    let mut settings = NodeSettings::new("client.example.com", "example.com");
    settings.watchdog_interval = Duration::from_secs(0);
    settings.dwa_timeout = Duration::from_millis(100);
    let node = Arc::new(Mutex::new(Node::new(settings, Arc::clone(&dict))));
    let peer = Node::handshake(Arc::clone(&node), stream).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_millis(500);
    loop {
        if peer.state().await == PeerState::Closing {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "connection did not close within budget"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(peer.disconnect_reason().await, Some(DisconnectReason::DwaTimeout));
}
