//! End-to-end channel scenarios against fixed wire captures.

use std::net::{TcpListener, TcpStream};
use std::thread;

use sealwire_client::{
    AsyncClient, ChannelConfig, Client, ClientBuilder, ClientError, FramingError, Nonce,
    PublicKey, SharedSecret, SymmetricParameters,
};
use sealwire_transport::{MemoryTransport, StdTransport, TokioTransport};

const RECEIVER: &str = "2615edec7d5d6538314132321a2615e1ff5550046e0f1165ff59150632d2301f";
const SENDER: &str = "50347216d43ab2e87f4146abaabd2e01e59aa6e49ba5174304a95df7239f01b1";
const SECRET: &str = "dbddc0d957850329766fd8e9a370a115d229625013ea5849900c063f9dc6ec6b";

fn key(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str).unwrap()
}

fn sync_client<T: sealwire_client::Transport>(params: &[u8], transport: T) -> Client<T> {
    Client::new(&key(RECEIVER), &key(SENDER), &key(SECRET), params, transport).unwrap()
}

fn wire_from_hex(wire_hex: &str) -> Vec<u8> {
    hex::decode(wire_hex).unwrap()
}

#[test]
fn test_captured_frame_matches_and_reopens() {
    let mut sender = sync_client(&[0u8; 160], MemoryTransport::new());
    sender.send(&[1, 2, 3, 4], &Nonce::from([0u8; 32])).unwrap();
    let wire = sender.into_transport().take_written();

    let expected = wire_from_hex(&format!(
        "00000034{}{}",
        "00".repeat(32),
        "10d9fce750bbc382584a382ae98df92f80ed9247"
    ));
    assert_eq!(wire, expected);

    let mut receiver = sync_client(&[0u8; 160], MemoryTransport::new().with_incoming(&wire));
    assert_eq!(receiver.receive().unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(receiver.transport().remaining_incoming(), 0);
}

#[test]
fn test_captured_empty_message() {
    let mut sender = sync_client(&[0u8; 160], MemoryTransport::new());
    sender.send(&[], &Nonce::from([0u8; 32])).unwrap();
    let wire = sender.into_transport().take_written();

    let expected = wire_from_hex(&format!(
        "00000030{}{}",
        "00".repeat(32),
        "10992b0de01720da55ce9c94e1f63d72"
    ));
    assert_eq!(wire, expected);
}

#[test]
fn test_captured_frame_with_counting_params() {
    let params: Vec<u8> = (0u8..160).collect();
    let mut sender = sync_client(&params, MemoryTransport::new());
    sender.send(b"hello sealwire", &Nonce::from([0x42; 32])).unwrap();
    let wire = sender.into_transport().take_written();

    assert_eq!(&wire[..4], &[0, 0, 0, 62]);
    assert_eq!(&wire[4..36], &[0x42; 32]);
    assert_eq!(hex::encode(&wire[36..50]), "1f8a68f715843c014056e8936907");
    assert_eq!(hex::encode(&wire[50..]), "0c0aa285d66b08138ecc483f7a531063");
}

#[test]
fn test_identity_order_changes_frame() {
    let mut swapped = Client::new(
        &key(SENDER),
        &key(RECEIVER),
        &key(SECRET),
        &[0u8; 160],
        MemoryTransport::new(),
    )
    .unwrap();
    swapped.send(&[1, 2, 3, 4], &Nonce::from([0u8; 32])).unwrap();
    let wire = swapped.into_transport().take_written();
    assert_eq!(
        hex::encode(&wire[36..]),
        "7f43299b368a6076aa7ca605b34927fe29522cb4"
    );

    let mut receiver = sync_client(&[0u8; 160], MemoryTransport::new().with_incoming(&wire));
    assert!(receiver.receive().unwrap_err().is_authentication_failure());
}

#[test]
fn test_frames_decode_back_to_back() {
    let mut sender = sync_client(&[9u8; 160], MemoryTransport::new());
    let messages: Vec<Vec<u8>> = vec![b"one".to_vec(), Vec::new(), vec![0xff; 4096]];
    for (i, message) in messages.iter().enumerate() {
        sender.send(message, &Nonce::from([i as u8; 32])).unwrap();
    }
    let wire = sender.into_transport().take_written();

    let mut receiver = sync_client(&[9u8; 160], MemoryTransport::new().with_incoming(&wire));
    for message in &messages {
        assert_eq!(&receiver.receive().unwrap(), message);
    }
    assert!(receiver.receive().unwrap_err().is_closed());
}

#[test]
fn test_echo_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut server = sync_client(&[0u8; 160], StdTransport::new(stream));
        let message = server.receive().unwrap();
        server.send(&message, &Nonce::from([0xee; 32])).unwrap();
    });

    let stream = TcpStream::connect(addr).unwrap();
    let mut client = sync_client(&[0u8; 160], StdTransport::new(stream));
    client.send(b"echo me", &Nonce::from([0x01; 32])).unwrap();
    assert_eq!(client.receive().unwrap(), b"echo me");

    server.join().unwrap();
}

#[tokio::test]
async fn test_async_peers_over_duplex() {
    let (left, right) = tokio::io::duplex(1024);
    let params = SymmetricParameters::from([3u8; 160]);

    let builder = ClientBuilder::new(
        PublicKey::try_from(key(RECEIVER).as_slice()).unwrap(),
        PublicKey::try_from(key(SENDER).as_slice()).unwrap(),
        SharedSecret::try_from(key(SECRET).as_slice()).unwrap(),
    )
    .symmetric_parameters(params);

    let mut alice = builder.clone().build_async(TokioTransport::new(left)).unwrap();
    let mut bob = builder.build_async(TokioTransport::new(right)).unwrap();

    let reader = tokio::spawn(async move {
        let first = bob.receive().await.unwrap();
        let second = bob.receive().await.unwrap();
        (first, second)
    });

    alice.send(b"over", &Nonce::from([1u8; 32])).await.unwrap();
    alice.send(b"duplex", &Nonce::from([2u8; 32])).await.unwrap();

    let (first, second) = reader.await.unwrap();
    assert_eq!(first, b"over");
    assert_eq!(second, b"duplex");
}

#[tokio::test]
async fn test_async_reads_frames_from_blocking_client() {
    let mut sender = sync_client(&[0u8; 160], MemoryTransport::new());
    sender.send(&[1, 2, 3, 4], &Nonce::from([0u8; 32])).unwrap();
    let wire = sender.into_transport().take_written();

    let mut receiver = AsyncClient::new(
        &key(RECEIVER),
        &key(SENDER),
        &key(SECRET),
        &[0u8; 160],
        MemoryTransport::new().with_incoming(&wire),
    )
    .unwrap();
    assert_eq!(receiver.receive().await.unwrap(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_async_peer_closing_early() {
    let (left, right) = tokio::io::duplex(64);
    let mut receiver = AsyncClient::new(
        &key(RECEIVER),
        &key(SENDER),
        &key(SECRET),
        &[0u8; 160],
        TokioTransport::new(left),
    )
    .unwrap();
    drop(right);

    assert!(receiver.receive().await.unwrap_err().is_closed());
}

#[test]
fn test_configured_limit_applies_to_both_sides() {
    let config = ChannelConfig::with_max_frame_len(128);
    let builder = ClientBuilder::from_slices(&key(RECEIVER), &key(SENDER), &key(SECRET))
        .unwrap()
        .symmetric_parameters(SymmetricParameters::default())
        .config(config);

    let mut sender = builder.clone().build(MemoryTransport::new()).unwrap();
    let err = sender.send(&[0u8; 81], &Nonce::from([0u8; 32])).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Framing(FramingError::LengthOutOfRange { len: 129, max: 128 })
    ));
    sender.send(&[0u8; 80], &Nonce::from([0u8; 32])).unwrap();

    let mut oversized = sync_client(&[0u8; 160], MemoryTransport::new());
    oversized.send(&[0u8; 200], &Nonce::from([0u8; 32])).unwrap();
    let wire = oversized.into_transport().take_written();

    let mut receiver = builder.build(MemoryTransport::new().with_incoming(&wire)).unwrap();
    assert!(matches!(
        receiver.receive().unwrap_err(),
        ClientError::Framing(FramingError::LengthOutOfRange { len: 248, max: 128 })
    ));
    assert_eq!(receiver.transport().read_requests(), &[4]);
}
