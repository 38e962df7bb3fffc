use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use restgate::dispatch::{Method, OperationKind, ParsedRequest, PipelineOutcome, Respond};
use restgate::http::connection::{Connection, MAX_HEADER_BYTES};
use restgate::routing::RouteTable;
use restgate::server::listener::serve;

struct Greeter;

#[async_trait]
impl Respond for Greeter {
    async fn respond(
        &self,
        _method: Option<Method>,
        kind: OperationKind,
        request: &ParsedRequest,
    ) -> PipelineOutcome {
        match kind {
            OperationKind::Create => PipelineOutcome::created(json!(request.model())),
            OperationKind::Delete => PipelineOutcome::no_content(),
            OperationKind::Unsupported => PipelineOutcome::method_not_allowed(),
            _ => PipelineOutcome::ok(json!({ "hello": "cat" })),
        }
    }
}

fn table() -> Arc<RouteTable> {
    let mut table = RouteTable::new();
    table.subscribe_resource("cat", Greeter).unwrap();
    Arc::new(table)
}

async fn exchange(raw: &[u8]) -> String {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let handle = tokio::spawn(async move { Connection::new(server, table()).run().await });

    client.write_all(raw).await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    handle.await.unwrap().unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_connection_answers_and_closes() {
    let out = exchange(b"GET /cat/1 HTTP/1.1\r\nConnection: close\r\n\r\n").await;

    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(out.ends_with(r#"{"hello":"cat"}"#));
}

#[tokio::test]
async fn test_connection_serves_pipelined_requests() {
    let out = exchange(
        b"POST /cat HTTP/1.1\r\nContent-Length: 13\r\n\r\n{\"cat\":\"tom\"}\
          DELETE /cat/1 HTTP/1.1\r\nConnection: close\r\n\r\n",
    )
    .await;

    let created = out.find("HTTP/1.1 201 Created\r\n").unwrap();
    let deleted = out.find("HTTP/1.1 204 No Content\r\n").unwrap();
    assert!(created < deleted);
    assert!(out.contains(r#"{"cat":"tom"}"#));
}

#[tokio::test]
async fn test_connection_unknown_method_is_405() {
    let out = exchange(b"BREW /cat HTTP/1.1\r\nConnection: close\r\n\r\n").await;

    assert!(out.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
}

#[tokio::test]
async fn test_connection_rejects_oversized_body() {
    let (mut client, server) = tokio::io::duplex(1024);
    let handle = tokio::spawn(async move {
        Connection::new(server, table())
            .with_max_body_bytes(8)
            .run()
            .await
    });

    client
        .write_all(b"POST /cat HTTP/1.1\r\nContent-Length: 100\r\n\r\n")
        .await
        .unwrap();

    assert!(handle.await.unwrap().is_err());
}

#[tokio::test]
async fn test_connection_rejects_endless_header_block() {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let handle = tokio::spawn(async move { Connection::new(server, table()).run().await });

    let mut raw = b"GET /cat HTTP/1.1\r\n".to_vec();
    while raw.len() <= MAX_HEADER_BYTES {
        raw.extend_from_slice(b"X-Padding: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n");
    }
    client.write_all(&raw).await.unwrap();

    assert!(handle.await.unwrap().is_err());
}

#[tokio::test]
async fn test_server_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, table(), 1024));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /dog HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut out = String::new();
    stream.read_to_string(&mut out).await.unwrap();

    assert!(out.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(out.ends_with(r#"{"message":"not found"}"#));
}
