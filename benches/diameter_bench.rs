#![feature(test)]

extern crate test;
use diameter::avp;
use diameter::avp::enumerated::EnumeratedAvp;
use diameter::avp::group::GroupedAvp;
use diameter::avp::identity::IdentityAvp;
use diameter::avp::unsigned32::Unsigned32Avp;
use diameter::avp::utf8string::UTF8StringAvp;
use diameter::dictionary;
use diameter::dictionary::Dictionary;
use diameter::message::{application_ids, command_codes, CommandFlags};
use diameter::{DiameterHeader, DiameterMessage};
use std::io::Cursor;
use std::sync::Arc;
use test::black_box;
use test::Bencher;

#[bench]
fn bench_decode_header(b: &mut Bencher) {
    let data = test_data();
    b.iter(|| {
        let mut cursor = Cursor::new(&data);
        black_box(DiameterHeader::decode_from(&mut cursor).unwrap())
    });
}

#[bench]
fn bench_encode_header(b: &mut Bencher) {
    let data = test_data();
    let mut cursor = Cursor::new(&data);
    let header = DiameterHeader::decode_from(&mut cursor).unwrap();

    let mut encoded = Vec::new();
    b.iter(|| {
        encoded.clear();
        black_box(header.encode_to(&mut encoded).unwrap());
    });
}

#[bench]
fn bench_decode_cca(b: &mut Bencher) {
    let dict = Arc::new(Dictionary::new(&[&dictionary::DEFAULT_DICT_XML]));

    let message = cca_message(Arc::clone(&dict));
    let mut data = Vec::new();
    message.encode_to(&mut data).unwrap();

    b.iter(|| {
        let mut cursor = Cursor::new(&data);
        black_box(DiameterMessage::decode_from(&mut cursor, Arc::clone(&dict)).unwrap())
    });
}

#[bench]
fn bench_encode_cca(b: &mut Bencher) {
    let dict = Arc::new(Dictionary::new(&[&dictionary::DEFAULT_DICT_XML]));

    let message = cca_message(dict);
    let mut encoded = Vec::new();
    b.iter(|| {
        encoded.clear();
        black_box(message.encode_to(&mut encoded).unwrap());
    });
}

fn test_data() -> &'static [u8] {
    &[
        0x01, 0x00, 0x00, 0x14, // version, length
        0x80, 0x00, 0x01, 0x10, // flags, code
        0x00, 0x00, 0x00, 0x04, // application_id
        0x00, 0x00, 0x00, 0x03, // hop_by_hop_id
        0x00, 0x00, 0x00, 0x04, // end_to_end_id
    ]
}

fn cca_message(dict: Arc<Dictionary>) -> DiameterMessage {
    let mut message = DiameterMessage::new(
        command_codes::CREDIT_CONTROL,
        application_ids::CREDIT_CONTROL,
        CommandFlags::new(true, true, false, false),
        1123158610,
        3102381851,
        Arc::clone(&dict),
    );

    message.add_avp(avp!(264, None, IdentityAvp::new("host.example.com"), true));
    message.add_avp(avp!(296, None, IdentityAvp::new("realm.example.com"), true));
    message.add_avp(avp!(263, None, UTF8StringAvp::new("ses;12345888"), true));
    message.add_avp(avp!(268, None, Unsigned32Avp::new(2001), true));
    message.add_avp(avp!(416, None, EnumeratedAvp::new(1), true));
    message.add_avp(avp!(415, None, Unsigned32Avp::new(1000), true));

    let ps_information = GroupedAvp::new(
        vec![avp!(30, None, UTF8StringAvp::new("10999"), true)],
        Arc::clone(&dict),
    );
    let service_information = GroupedAvp::new(
        vec![avp!(874, Some(10415), ps_information, true)],
        Arc::clone(&dict),
    );

    message.add_avp(avp!(873, Some(10415), service_information, true));
    message
}

fn main() {}
