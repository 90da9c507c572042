//! End-to-end runs of the protocol server over in-memory links.

use std::time::Duration;

use serialprot::config::Config;
use serialprot::link::Link;
use serialprot::outputs::{OutputBank, OutputState};
use serialprot::server::ProtocolServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;

fn server(config: &Config) -> ProtocolServer<OutputBank> {
    ProtocolServer::new(config, "test", OutputBank::new(config.outputs.names.clone()))
}

#[tokio::test]
async fn serves_lines_until_link_closes() {
    let config = Config::default();
    let (client, device_side) = tokio::io::duplex(512);
    let (rd, wr) = tokio::io::split(device_side);
    let link = Link::from_io("duplex", rd, wr, false);
    let mut srv = server(&config);
    let run = tokio::spawn(async move {
        let result = srv.run(link).await;
        result.map(|_| srv)
    });

    let (mut client_rd, mut client_wr) = tokio::io::split(client);
    client_wr
        .write_all(b"#add,3:4\r#gpo,bl:on\r")
        .await
        .unwrap();
    client_wr.shutdown().await.unwrap();

    let mut received = Vec::new();
    timeout(Duration::from_secs(5), client_rd.read_to_end(&mut received))
        .await
        .expect("server closed the link")
        .unwrap();
    let text = String::from_utf8(received).unwrap();
    assert_eq!(
        text,
        concat!(
            "Input> ",
            "#add,3:4\n\rACK -> #add,3:4 => #a,7\n\rInput> ",
            "#gpo,bl:on\n\rACK -> #gpo,bl:on\n\rInput> ",
        )
    );

    let srv = run.await.unwrap().expect("clean shutdown");
    assert_eq!(srv.session().outputs().state("bl"), Some(OutputState::On));
}

#[tokio::test]
async fn newline_translation_completes_lines() {
    let config = Config::default();
    let (client, device_side) = tokio::io::duplex(512);
    let (rd, wr) = tokio::io::split(device_side);
    let link = Link::from_io("console", rd, wr, true);
    let mut srv = server(&config);
    let run = tokio::spawn(async move { srv.run(link).await });

    let (mut client_rd, mut client_wr) = tokio::io::split(client);
    client_wr.write_all(b"#asc,A:0\n").await.unwrap();
    client_wr.shutdown().await.unwrap();

    let mut received = String::new();
    timeout(Duration::from_secs(5), client_rd.read_to_string(&mut received))
        .await
        .expect("server closed the link")
        .unwrap();
    assert!(received.contains("ACK -> #asc,A:0 => #a,65"), "{received:?}");
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn each_response_is_a_separate_write() {
    let config = Config::default();
    let writer = tokio_test::io::Builder::new()
        .write(b"Input> ")
        .write(b"\n\rInput> ")
        .write(b"x")
        .write(b"\x08 \x08")
        .build();
    let (mut client, device_side) = tokio::io::duplex(64);
    let link = Link::from_io("mock", device_side, writer, false);

    client.write_all(b"\rx\x7f").await.unwrap();
    client.shutdown().await.unwrap();

    let mut srv = server(&config);
    timeout(Duration::from_secs(5), srv.run(link))
        .await
        .expect("run finished")
        .expect("clean shutdown");
}

#[tokio::test]
async fn transmit_failure_is_fatal() {
    let config = Config::default();
    let writer = tokio_test::io::Builder::new()
        .write_error(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "device unplugged",
        ))
        .build();
    let (_client, device_side) = tokio::io::duplex(64);
    let link = Link::from_io("mock", device_side, writer, false);

    let mut srv = server(&config);
    let err = timeout(Duration::from_secs(5), srv.run(link))
        .await
        .expect("run finished")
        .unwrap_err();
    assert!(err.to_string().contains("transmit failed"), "{err}");
}

#[tokio::test]
async fn dead_writer_reports_its_own_error() {
    let config = Config::default();
    let (in_tx, in_rx) = tokio::sync::mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = tokio::sync::mpsc::unbounded_channel::<Vec<u8>>();
    // Accept the prompt, then fail as a broken device would
    let writer = tokio::spawn(async move {
        let _ = out_rx.recv().await;
        drop(out_rx);
        Err(anyhow::anyhow!("transmit failed: cable cut"))
    });
    in_tx.send(b"#add,3:4\r".to_vec()).unwrap();
    let link = Link {
        name: "dead".to_string(),
        incoming: in_rx,
        outgoing: out_tx,
        writer,
    };

    let mut srv = server(&config);
    let err = timeout(Duration::from_secs(5), srv.run(link))
        .await
        .expect("run finished")
        .unwrap_err();
    assert_eq!(err.to_string(), "transmit failed: cable cut");
    drop(in_tx);
}
