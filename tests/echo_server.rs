//! End-to-end tests over real TCP with a tokio-tungstenite client.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use ws_echo::{EchoServer, Payload, RouteTable};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// Helpers
// ============================================================================

async fn start() -> Result<Arc<EchoServer>> {
    let routes = RouteTable::standard(100)?;
    Ok(EchoServer::start(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, routes).await?)
}

async fn connect(server: &EchoServer, path: &str) -> Result<Client> {
    let (client, _response) = connect_async(server.ws_url(path))
        .await
        .with_context(|| format!("connect {path}"))?;
    Ok(client)
}

/// Next text or binary message; `None` once the server closes.
async fn next_data(client: &mut Client) -> Result<Option<Message>> {
    while let Some(message) = client.next().await {
        match message? {
            message @ (Message::Text(_) | Message::Binary(_)) => return Ok(Some(message)),
            Message::Close(_) => return Ok(None),
            _ => continue,
        }
    }
    Ok(None)
}

async fn echo(client: &mut Client, message: Message) -> Result<Message> {
    client.send(message).await?;
    next_data(client).await?.context("connection closed before echo")
}

async fn http_get(server: &EchoServer, target: &str) -> Result<String> {
    let mut stream = TcpStream::connect(server.local_addr()).await?;
    let request = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await?;
    Ok(response)
}

// ============================================================================
// Echo
// ============================================================================

#[tokio::test]
async fn text_route_echoes_text() -> Result<()> {
    let server = start().await?;
    let mut client = connect(&server, "/sendRecvText").await?;

    for text in ["hello", "second message", "ünïcödé ✓"] {
        assert_eq!(echo(&mut client, Message::text(text)).await?, Message::text(text));
    }

    client.close(None).await?;
    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn binary_routes_echo_bytes() -> Result<()> {
    let server = start().await?;

    for path in ["/sendRecvArrayBuffer", "/sendRecvBlob"] {
        let mut client = connect(&server, path).await?;
        let data: Vec<u8> = (0..=255).rev().collect();
        let echoed = echo(&mut client, Message::binary(data.clone())).await?;
        assert_eq!(echoed, Message::binary(data), "route {path}");
        client.close(None).await?;
    }

    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn json_route_round_trips_payload() -> Result<()> {
    let server = start().await?;
    let mut client = connect(&server, "/json").await?;

    let echoed = echo(&mut client, Message::text(r#"{"Msg":"hi","Path":"/json"}"#)).await?;
    let payload = Payload::from_json(echoed.to_text()?)?;
    assert_eq!(payload, Payload::new("hi", "/json"));

    client.close(None).await?;
    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn json_route_closes_on_malformed_payload() -> Result<()> {
    let server = start().await?;
    let mut client = connect(&server, "/json").await?;

    client.send(Message::text("not json")).await?;
    assert!(next_data(&mut client).await?.is_none());

    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn json_route_refuses_array_payload() -> Result<()> {
    let server = start().await?;
    let mut client = connect(&server, "/json").await?;

    client.send(Message::text(r#"["hi","/json"]"#)).await?;
    if let Some(message) = next_data(&mut client).await? {
        bail!("array payload was echoed: {message:?}");
    }

    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn read_write_route_splits_into_chunks() -> Result<()> {
    let server = start().await?;
    let mut client = connect(&server, "/readWrite").await?;

    let message = "x".repeat(250);
    client.send(Message::text(message.clone())).await?;

    let mut sizes = Vec::new();
    let mut joined = String::new();
    for _ in 0..3 {
        let chunk = next_data(&mut client).await?.context("missing chunk")?;
        let text = chunk.to_text()?;
        sizes.push(text.len());
        joined.push_str(text);
    }

    assert_eq!(sizes, [100, 100, 50]);
    assert_eq!(joined, message);

    client.close(None).await?;
    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn copy_route_forwards_bytes() -> Result<()> {
    let server = start().await?;
    let mut client = connect(&server, "/copy").await?;

    assert_eq!(
        echo(&mut client, Message::text("copy me")).await?,
        Message::text("copy me")
    );
    assert_eq!(
        echo(&mut client, Message::binary(vec![1u8, 2, 3])).await?,
        Message::binary(vec![1u8, 2, 3])
    );

    client.close(None).await?;
    server.shutdown();
    Ok(())
}

// ============================================================================
// Termination & Independence
// ============================================================================

#[tokio::test]
async fn client_close_is_answered() -> Result<()> {
    let server = start().await?;
    let mut client = connect(&server, "/sendRecvText").await?;

    assert_eq!(echo(&mut client, Message::text("last")).await?, Message::text("last"));

    client.send(Message::Close(None)).await?;
    let reply = client.next().await.context("stream ended without a close reply")??;
    assert!(matches!(reply, Message::Close(_)), "expected close reply, got {reply:?}");

    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn type_mismatch_closes_without_echo() -> Result<()> {
    let server = start().await?;
    let mut client = connect(&server, "/sendRecvText").await?;

    client.send(Message::binary(vec![0u8, 1, 2])).await?;
    if let Some(message) = next_data(&mut client).await? {
        bail!("unexpected echo: {message:?}");
    }

    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn failing_connection_does_not_affect_another() -> Result<()> {
    let server = start().await?;
    let mut healthy = connect(&server, "/sendRecvText").await?;
    let mut failing = connect(&server, "/sendRecvText").await?;

    assert_eq!(echo(&mut healthy, Message::text("before")).await?, Message::text("before"));

    failing.send(Message::binary(vec![0xFFu8])).await?;
    assert!(next_data(&mut failing).await?.is_none());

    assert_eq!(echo(&mut healthy, Message::text("after")).await?, Message::text("after"));

    healthy.close(None).await?;
    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn many_concurrent_connections() -> Result<()> {
    let server = start().await?;

    let mut tasks = Vec::new();
    for i in 0..16 {
        let url = server.ws_url("/sendRecvText");
        tasks.push(tokio::spawn(async move {
            let (mut client, _) = connect_async(url).await?;
            let text = format!("client {i}");
            let echoed = echo(&mut client, Message::text(text.clone())).await?;
            client.close(None).await?;
            anyhow::ensure!(echoed == Message::text(text), "wrong echo for client {i}");
            Ok::<_, anyhow::Error>(())
        }));
    }

    for task in tasks {
        task.await??;
    }

    server.shutdown();
    Ok(())
}

// ============================================================================
// Info Page
// ============================================================================

#[tokio::test]
async fn plain_get_serves_info_page() -> Result<()> {
    let server = start().await?;

    let response = http_get(&server, "/").await?;
    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains("text/html"));
    assert!(response.contains(r#"<option value="/json">/json</option>"#));

    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn routed_path_without_upgrade_serves_info_page() -> Result<()> {
    let server = start().await?;

    let response = http_get(&server, "/json").await?;
    assert!(response.starts_with("HTTP/1.1 200 OK"));

    server.shutdown();
    Ok(())
}

#[tokio::test]
async fn unrouted_upgrade_is_refused() -> Result<()> {
    let server = start().await?;

    let result = connect_async(server.ws_url("/nowhere")).await;
    assert!(result.is_err(), "upgrade on an unrouted path must not succeed");

    server.shutdown();
    Ok(())
}
