use chrono::Local;
use diameter::avp;
use diameter::avp::enumerated::EnumeratedAvp;
use diameter::avp::group::GroupedAvp;
use diameter::avp::identity::IdentityAvp;
use diameter::avp::unsigned32::Unsigned32Avp;
use diameter::avp::utf8string::UTF8StringAvp;
use diameter::dictionary::{self, Dictionary};
use diameter::message::{command_codes, CommandFlags};
use diameter::transport::DiameterServer;
use diameter::transport::DiameterServerConfig;
use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::thread;

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

    let config = DiameterServerConfig { native_tls: None };

    let addr = "0.0.0.0:3868";
    let mut server = DiameterServer::new(addr, config).await.unwrap();
    log::info!("Listening at {}", addr);

    let dict_ref = Arc::clone(&dict);
    server
        .listen(
            move |req| {
                let dict_ref2 = Arc::clone(&dict_ref);
                async move {
                    log::info!("Received request: {}", req);

                    let mut res = req.new_answer();

                    match req.get_command_code() {
                        command_codes::CAPABILITIES_EXCHANGE => {
                            res.add_avp(avp!(264, None, IdentityAvp::new("host.example.com"), true));
                            res.add_avp(avp!(296, None, IdentityAvp::new("realm.example.com"), true));
                            res.add_avp(avp!(266, None, Unsigned32Avp::new(35838), true));
                            res.add_avp(avp!(269, None, UTF8StringAvp::new("diameter-rs")));
                            res.add_avp(avp!(258, None, Unsigned32Avp::new(4), true));
                            res.add_avp(avp!(268, None, Unsigned32Avp::new(2001), true));
                        }
                        _ => {
                            res.add_avp(avp!(264, None, IdentityAvp::new("host.example.com"), true));
                            res.add_avp(avp!(296, None, IdentityAvp::new("realm.example.com"), true));
                            res.add_avp(avp!(263, None, UTF8StringAvp::new("ses;123458890"), true));
                            res.add_avp(avp!(416, None, EnumeratedAvp::new(1), true));
                            res.add_avp(avp!(415, None, Unsigned32Avp::new(1000), true));
                            res.add_avp(avp!(268, None, Unsigned32Avp::new(2001), true));

                            let mscc = GroupedAvp::new(
                                vec![
                                    avp!(439, None, Unsigned32Avp::new(7786), true),
                                    avp!(432, None, Unsigned32Avp::new(7786), true),
                                    avp!(268, None, Unsigned32Avp::new(2001), true),
                                ],
                                Arc::clone(&dict_ref2),
                            );
                            res.add_avp(avp!(456, None, mscc, true));

                            let ps_info = GroupedAvp::new(
                                vec![avp!(30, None, UTF8StringAvp::new("10999"), true)],
                                Arc::clone(&dict_ref2),
                            );
                            let service_info = GroupedAvp::new(
                                vec![avp!(874, Some(10415), ps_info, true)],
                                Arc::clone(&dict_ref2),
                            );
                            res.add_avp(avp!(873, Some(10415), service_info, true));
                        }
                    }

                    Ok(res)
                }
            },
            dict,
        )
        .await
        .unwrap();
}
