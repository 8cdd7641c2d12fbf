use diameter::avp;
use diameter::avp::address::AddressAvp;
use diameter::avp::enumerated::EnumeratedAvp;
use diameter::avp::identity::IdentityAvp;
use diameter::avp::unsigned32::Unsigned32Avp;
use diameter::avp::utf8string::UTF8StringAvp;
use diameter::dictionary::{self, Dictionary};
use diameter::message::{application_ids, command_codes, CommandFlags};
use diameter::transport::DiameterClient;
use diameter::transport::DiameterClientConfig;
use diameter::DiameterMessage;
use std::fs;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dict = Dictionary::new(&[
        &dictionary::DEFAULT_DICT_XML,
        &fs::read_to_string("dict/3gpp-ro-rf.xml").unwrap(),
    ]);
    let dict = Arc::new(dict);

    let client_config = DiameterClientConfig {
        use_tls: false,
        verify_cert: false,
    };
    let mut client = DiameterClient::new("localhost:3868", client_config);
    let mut handler = client.connect().await.unwrap();
    let dict_ref = Arc::clone(&dict);
    tokio::spawn(async move {
        DiameterClient::handle(&mut handler, dict_ref).await;
    });

    send_cer(&mut client, Arc::clone(&dict)).await;
    send_ccr(&mut client, Arc::clone(&dict)).await;
}

async fn send_cer(client: &mut DiameterClient, dict: Arc<Dictionary>) {
    let seq_num = client.get_next_seq_num();
    let mut cer = DiameterMessage::new(
        command_codes::CAPABILITIES_EXCHANGE,
        application_ids::COMMON,
        CommandFlags::new(true, false, false, false),
        seq_num,
        seq_num,
        dict,
    );
    cer.add_avp(avp!(264, None, IdentityAvp::new("host.example.com"), true));
    cer.add_avp(avp!(296, None, IdentityAvp::new("realm.example.com"), true));
    cer.add_avp(avp!(
        257,
        None,
        AddressAvp::parse("127.0.0.1").unwrap(),
        true
    ));
    cer.add_avp(avp!(266, None, Unsigned32Avp::new(35838), true));
    cer.add_avp(avp!(269, None, UTF8StringAvp::new("diameter-rs")));

    let resp = client.send_message(cer).await.unwrap();
    let cea = resp.await.unwrap();
    log::info!("Received response: {}", cea);
}

async fn send_ccr(client: &mut DiameterClient, dict: Arc<Dictionary>) {
    let seq_num = client.get_next_seq_num();
    let mut ccr = DiameterMessage::new(
        command_codes::CREDIT_CONTROL,
        application_ids::CREDIT_CONTROL,
        CommandFlags::new(true, true, false, false),
        seq_num,
        seq_num,
        dict,
    );
    ccr.add_avp(avp!(264, None, IdentityAvp::new("host.example.com"), true));
    ccr.add_avp(avp!(296, None, IdentityAvp::new("realm.example.com"), true));
    ccr.add_avp(avp!(263, None, UTF8StringAvp::new("ses;12345888"), true));
    ccr.add_avp(avp!(416, None, EnumeratedAvp::new(1), true));
    ccr.add_avp(avp!(415, None, Unsigned32Avp::new(1000), true));
    ccr.add_avp(avp!(
        1228,
        Some(10415),
        AddressAvp::parse("127.0.0.1").unwrap(),
        true
    ));

    let resp = client.send_message(ccr).await.unwrap();
    let cca = resp.await.unwrap();
    log::info!("Received response: {}", cca);
}
