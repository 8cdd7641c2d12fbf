use chrono::Local;
use diameter::avp;
use diameter::avp::address::AddressAvp;
use diameter::avp::enumerated::EnumeratedAvp;
use diameter::avp::identity::IdentityAvp;
use diameter::avp::unsigned32::Unsigned32Avp;
use diameter::avp::utf8string::UTF8StringAvp;
use diameter::dictionary::{self, Dictionary};
use diameter::message::{application_ids, command_codes, CommandFlags};
use diameter::transport::{DiameterClient, DiameterClientConfig};
use diameter::DiameterMessage;
use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use tokio::task;
use tokio::task::JoinHandle;

#[tokio::main]
async fn main() {
    env_logger::Builder::new()
        .format(|buf, record| {
            let now = Local::now();
            let thread = thread::current();
            let thread_name = thread.name().unwrap_or("unnamed");
            let thread_id = thread.id();

            writeln!(
                buf,
                "{} [{}] {:?} - ({}): {}",
                now.format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                thread_id,
                thread_name,
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();

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

    let mut session_count = 0;
    let mut ccri_handles = vec![];
    let batch_size = 10;
    for _ in 0..batch_size {
        let session_id = format!("ses;{:09}", session_count);
        session_count += 1;
        ccri_handles.push(send_ccr_i(&mut client, Arc::clone(&dict), session_id).await);
    }

    let mut ccrt_handles = vec![];
    for handle in ccri_handles {
        let session_id = handle.await.unwrap();
        ccrt_handles.push(send_ccr_t(&mut client, Arc::clone(&dict), session_id).await);
    }

    for handle in ccrt_handles {
        handle.await.unwrap();
    }
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
    let _cea = resp.await.unwrap();
}

fn ccr_i_or_t(
    dict: Arc<Dictionary>,
    seq_num: u32,
    session_id: &str,
    request_type: i32,
) -> DiameterMessage {
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
    ccr.add_avp(avp!(263, None, UTF8StringAvp::new(session_id), true));
    ccr.add_avp(avp!(416, None, EnumeratedAvp::new(request_type), true));
    ccr.add_avp(avp!(415, None, Unsigned32Avp::new(1000), true));
    ccr.add_avp(avp!(
        1228,
        Some(10415),
        AddressAvp::parse("127.0.0.1").unwrap(),
        true
    ));
    ccr
}

async fn send_ccr_i(
    client: &mut DiameterClient,
    dict: Arc<Dictionary>,
    session_id: String,
) -> JoinHandle<String> {
    let seq_num = client.get_next_seq_num();
    let ccr = ccr_i_or_t(dict, seq_num, &session_id, 1);

    log::info!(
        "CCR-I  Request sent id: {:>2} session_id: {}",
        seq_num,
        session_id
    );
    let resp = client.send_message(ccr).await.unwrap();

    task::spawn(async move {
        let cca = resp.await.unwrap();
        let returned_session_id = cca
            .get_avp(263)
            .and_then(|avp| avp.get_utf8string())
            .unwrap()
            .to_string();
        log::info!(
            "CCR-I Response recv id: {:>2} session_id: {}",
            cca.get_hop_by_hop_id(),
            returned_session_id
        );
        returned_session_id
    })
}

async fn send_ccr_t(
    client: &mut DiameterClient,
    dict: Arc<Dictionary>,
    session_id: String,
) -> JoinHandle<()> {
    let seq_num = client.get_next_seq_num();
    let ccr = ccr_i_or_t(dict, seq_num, &session_id, 3);

    log::info!(
        "CCR-T  Request sent id: {:>2} session_id: {}",
        seq_num,
        session_id
    );
    let resp = client.send_message(ccr).await.unwrap();

    task::spawn(async move {
        let cca = resp.await.unwrap();
        let returned_session_id = cca
            .get_avp(263)
            .and_then(|avp| avp.get_utf8string())
            .unwrap()
            .to_string();
        log::info!(
            "CCR-T Response recv id: {:>2} session_id: {}",
            cca.get_hop_by_hop_id(),
            returned_session_id
        );
    })
}
