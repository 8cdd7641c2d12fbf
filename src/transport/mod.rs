//! Diameter Protocol Transport

pub mod client;
pub mod server;

use crate::dictionary::Dictionary;
pub use crate::transport::client::{DiameterClient, DiameterClientConfig};
pub use crate::transport::server::{DiameterServer, DiameterServerConfig};

use crate::config::DEFAULT_MAX_MESSAGE_SIZE;
use crate::error::{Error, Result};
use crate::message::DiameterMessage;
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;

/// Encodes and decodes length-prefixed Diameter messages over a stream
/// transport (TCP or, via the `native-tls` wrapper, TLS).
pub struct Codec {}

impl Codec {
    /// Reads one full Diameter message from `reader`, blocking until the
    /// header's declared length is satisfied or the stream closes early.
    pub async fn decode<R>(reader: &mut R, dict: Arc<Dictionary>) -> Result<DiameterMessage>
    where
        R: AsyncReadExt + Unpin,
    {
        let mut b = [0; 4];
        reader.read_exact(&mut b).await?;
        let length = u32::from_be_bytes([0, b[1], b[2], b[3]]);

        if length as usize > DEFAULT_MAX_MESSAGE_SIZE {
            return Err(Error::BadFraming(format!(
                "message length {} exceeds the {}-byte ceiling",
                length, DEFAULT_MAX_MESSAGE_SIZE
            )));
        }
        if (length as usize) < 20 {
            return Err(Error::BadFraming(format!(
                "message length {} shorter than the header itself",
                length
            )));
        }

        let mut buffer = Vec::with_capacity(length as usize);
        buffer.extend_from_slice(&b);
        buffer.resize(length as usize, 0);
        reader.read_exact(&mut buffer[4..]).await?;

        let mut cursor = Cursor::new(buffer);
        DiameterMessage::decode_from(&mut cursor, dict)
    }

    pub async fn encode<W>(writer: &mut W, msg: &DiameterMessage) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
    {
        let mut b = Vec::new();
        msg.encode_to(&mut b)?;
        writer.write_all(&b).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cea::CapabilitiesExchangeAnswer;
    use crate::commands::cer::CapabilitiesExchangeRequest;
    use crate::dictionary::{self, Dictionary};
    use crate::result_code::DIAMETER_SUCCESS;
    use crate::transport::{DiameterClient, DiameterClientConfig, DiameterServer, DiameterServerConfig};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_diameter_transport_cer_cea() {
        let dict = Arc::new(Dictionary::new(&[&dictionary::DEFAULT_DICT_XML]));

        let mut server =
            DiameterServer::new("127.0.0.1:0", DiameterServerConfig { native_tls: None })
                .await
                .unwrap();
        let addr = server.local_addr().unwrap();

        let dict_ref = Arc::clone(&dict);
        tokio::spawn(async move {
            server
                .listen(
                    move |req| {
                        let dict_ref2 = Arc::clone(&dict_ref);
                        async move {
                            let mut ans = req.new_answer();
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
                            let _ = dict_ref2;
                            Ok(ans)
                        }
                    },
                    Arc::clone(&dict),
                )
                .await
                .unwrap();
        });

        let client_config = DiameterClientConfig {
            use_tls: false,
            verify_cert: false,
        };
        let mut client = DiameterClient::new(&addr.to_string(), client_config);
        let mut handler = client.connect().await.unwrap();
        let dict_ref = Arc::clone(&dict);
        tokio::spawn(async move {
            DiameterClient::handle(&mut handler, dict_ref).await;
        });

        let cer = CapabilitiesExchangeRequest {
            origin_host: "client.example.com".into(),
            origin_realm: "example.com".into(),
            host_ip_addresses: vec![],
            vendor_id: 0,
            product_name: "diameter-rs".into(),
            origin_state_id: None,
            supported_vendor_ids: vec![],
            auth_application_ids: vec![4],
            acct_application_ids: vec![],
            vendor_specific_application_id: None,
            additional_avps: vec![],
        };
        let req = cer.build(client.get_next_seq_num(), 1, Arc::clone(&dict));
        let response = client.send_message(req).await.unwrap();
        let cea = response.await.unwrap();

        let parsed = CapabilitiesExchangeAnswer::from_message(&cea).unwrap();
        assert_eq!(parsed.result_code, DIAMETER_SUCCESS);
    }
}
