use diameter::commands::cea::CapabilitiesExchangeAnswer;
use diameter::config::NodeSettings;
use diameter::dictionary::{self, Dictionary};
use diameter::message::{application_ids, command_codes, CommandFlags, DiameterMessage};
use diameter::node::Node;
use diameter::result_code::DIAMETER_SUCCESS;
use diameter::transport::Codec;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::time::Duration;

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

fn dict() -> Arc<Dictionary> {
    Arc::new(Dictionary::new(&[&dictionary::DEFAULT_DICT_XML]))
}

fn ccr(hop_by_hop: u32, dict: Arc<Dictionary>) -> DiameterMessage {
    DiameterMessage::new(
        command_codes::CREDIT_CONTROL,
        application_ids::CREDIT_CONTROL,
        CommandFlags::new(true, false, false, false),
        hop_by_hop,
        hop_by_hop,
        dict,
    )
}

/// Answers arriving out of hop-by-hop order must still reach the request
/// that actually matches their id, not the one sent first.
#[tokio::test]
async fn test_answers_out_of_order_correlate_by_hop_by_hop_id() {
    let dict = dict();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let peer_dict = Arc::clone(&dict);
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let cer = Codec::decode(&mut stream, Arc::clone(&peer_dict)).await.unwrap();
        Codec::encode(&mut stream, &cea_answer(&cer)).await.unwrap();

        let req1 = Codec::decode(&mut stream, Arc::clone(&peer_dict)).await.unwrap();
        let req2 = Codec::decode(&mut stream, Arc::clone(&peer_dict)).await.unwrap();

        // answer the second request first
        Codec::encode(&mut stream, &req2.new_answer()).await.unwrap();
        Codec::encode(&mut stream, &req1.new_answer()).await.unwrap();
    });

    let stream = TcpStream::connect(addr).await.unwrap();
    let node = Arc::new(Mutex::new(Node::new(
        NodeSettings::new("client.example.com", "example.com"),
        Arc::clone(&dict),
    )));
    let peer = Node::handshake(Arc::clone(&node), stream).await.unwrap();

    let (hop1, hop2) = (111, 222);
    let node_guard = node.lock().await;
    let fut1 = node_guard.send_request(&peer, ccr(hop1, Arc::clone(&dict)), Duration::from_secs(2));
    let fut2 = node_guard.send_request(&peer, ccr(hop2, Arc::clone(&dict)), Duration::from_secs(2));
    let (ans1, ans2) = tokio::join!(fut1, fut2);

    assert_eq!(ans1.unwrap().get_hop_by_hop_id(), hop1);
    assert_eq!(ans2.unwrap().get_hop_by_hop_id(), hop2);
}

/// A request that never gets an answer must time out rather than hang.
#[tokio::test]
async fn test_send_request_times_out_when_the_peer_stays_silent() {
    let dict = dict();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let peer_dict = Arc::clone(&dict);
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let cer = Codec::decode(&mut stream, Arc::clone(&peer_dict)).await.unwrap();
        Codec::encode(&mut stream, &cea_answer(&cer)).await.unwrap();

        // accept the request but never answer it
        let _req = Codec::decode(&mut stream, Arc::clone(&peer_dict)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let stream = TcpStream::connect(addr).await.unwrap();
    let node = Arc::new(Mutex::new(Node::new(
        NodeSettings::new("client.example.com", "example.com"),
        Arc::clone(&dict),
    )));
    let peer = Node::handshake(Arc::clone(&node), stream).await.unwrap();

    let node_guard = node.lock().await;
    let result = node_guard
        .send_request(&peer, ccr(99, Arc::clone(&dict)), Duration::from_millis(200))
        .await;
    assert!(result.is_err());
}
