//! End-to-end tests: `DirectMessageClient` over the real REST gateway and
//! WebSocket transport.

mod common;

use std::{sync::Arc, time::Duration};

use tayori_client::{
    config::{ApiConfig, ConnectionConfig, ReconnectConfig},
    domain::{CLOSE_NORMAL, ChatSnapshot, ConnectionState},
    infrastructure::{rest::HttpThreadApi, transport::WebSocketConnector},
    usecase::{ConnectionDeps, DirectMessageClient},
};
use tokio::{sync::watch, time::timeout};

use common::{AUTH_TOKEN, TestBackend, WAIT};

fn client(backend: &TestBackend, heartbeat: Duration) -> DirectMessageClient {
    let api = Arc::new(
        HttpThreadApi::new(&ApiConfig {
            api_base_url: backend.api_url(),
            auth_token: Some(AUTH_TOKEN.to_string()),
        })
        .unwrap(),
    );
    let config = ConnectionConfig {
        ws_base_url: backend.ws_url(),
        heartbeat_interval: heartbeat,
        reconnect: ReconnectConfig {
            base_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(100),
            max_attempts: 5,
        },
    };
    let deps = ConnectionDeps::new(config, api.clone(), Arc::new(WebSocketConnector::new()));
    DirectMessageClient::new(deps, api)
}

async fn wait_for<F>(rx: &mut watch::Receiver<ChatSnapshot>, predicate: F) -> ChatSnapshot
where
    F: FnMut(&ChatSnapshot) -> bool,
{
    timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("snapshot channel closed")
        .clone()
}

#[tokio::test]
async fn test_receive_and_send_messages() {
    // テスト項目: 受信したメッセージと入力中通知が反映され、送信したメッセージがサーバーに届く
    // given (前提条件):
    let mut backend = TestBackend::start().await;
    let mut client = client(&backend, Duration::from_secs(30));
    let mut rx = client.subscribe();
    client.connect(Some("abc")).await;
    let mut server = backend.accept().await;
    wait_for(&mut rx, |s| s.is_connected()).await;

    // when (操作):
    server
        .send_text(r#"{"event":"new_message","message":{"id":1,"threadId":"abc","senderId":2,"content":"hi","sentAt":"2024-05-01T10:00:00Z"}}"#)
        .await;
    server
        .send_text(r#"{"event":"typing","userId":2,"username":"bob","isTyping":true}"#)
        .await;
    let snapshot = wait_for(&mut rx, |s| !s.typing_users.is_empty()).await;
    client.send_message("hello").await.unwrap();
    client.set_typing(false);

    // then (期待する結果):
    assert_eq!(server.token, "tok-1");
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].content, "hi");
    assert_eq!(snapshot.messages[0].sender_id.as_deref(), Some("2"));
    assert_eq!(snapshot.typing_users, ["bob"]);
    assert_eq!(
        server.recv_text().await.as_deref(),
        Some(r#"{"type":"send_message","content":"hello"}"#)
    );
    assert_eq!(
        server.recv_text().await.as_deref(),
        Some(r#"{"type":"typing","is_typing":false}"#)
    );
}

#[tokio::test]
async fn test_abnormal_close_reconnects_with_fresh_token() {
    // テスト項目: 異常切断後に新しいトークンで再接続され、メッセージ履歴は保持される
    // given (前提条件):
    let mut backend = TestBackend::start().await;
    let mut client = client(&backend, Duration::from_secs(30));
    let mut rx = client.subscribe();
    client.connect(Some("abc")).await;
    let mut first = backend.accept().await;
    wait_for(&mut rx, |s| s.is_connected()).await;
    first
        .send_text(r#"{"event":"new_message","message":{"id":"m1","content":"before"}}"#)
        .await;
    wait_for(&mut rx, |s| !s.messages.is_empty()).await;

    // when (操作):
    first.close(1011).await;
    let lost = wait_for(&mut rx, |s| s.retry.is_some()).await;
    let second = backend.accept().await;
    let reconnected = wait_for(&mut rx, |s| s.is_connected()).await;

    // then (期待する結果):
    assert_eq!(lost.retry.map(|r| r.attempt), Some(1));
    assert_eq!(second.token, "tok-2");
    assert_eq!(backend.tokens_issued(), 2);
    assert_eq!(reconnected.messages.len(), 1);
    assert_eq!(reconnected.retry, None);
}

#[tokio::test]
async fn test_deliberate_server_close_stays_disconnected() {
    // テスト項目: サーバーが 1000 で閉じた場合は再接続しない
    // given (前提条件):
    let mut backend = TestBackend::start().await;
    let mut client = client(&backend, Duration::from_secs(30));
    let mut rx = client.subscribe();
    client.connect(Some("abc")).await;
    let server = backend.accept().await;
    wait_for(&mut rx, |s| s.is_connected()).await;

    // when (操作):
    server.close(CLOSE_NORMAL).await;
    let snapshot = wait_for(&mut rx, |s| s.status == ConnectionState::Disconnected).await;

    // then (期待する結果):
    assert_eq!(snapshot.retry, None);
    assert!(!backend.accepts_within(Duration::from_millis(300)).await);
    assert_eq!(backend.tokens_issued(), 1);
}

#[tokio::test]
async fn test_heartbeat_reaches_server() {
    // テスト項目: 接続中は ping が定期的に送信される
    // given (前提条件):
    let mut backend = TestBackend::start().await;
    let mut client = client(&backend, Duration::from_millis(50));
    let mut rx = client.subscribe();

    // when (操作):
    client.connect(Some("abc")).await;
    let mut server = backend.accept().await;
    wait_for(&mut rx, |s| s.is_connected()).await;

    // then (期待する結果):
    assert_eq!(server.recv_text().await.as_deref(), Some(r#"{"type":"ping"}"#));
    assert_eq!(server.recv_text().await.as_deref(), Some(r#"{"type":"ping"}"#));
}

#[tokio::test]
async fn test_switching_threads_closes_previous_connection() {
    // テスト項目: スレッド切り替え時に旧接続は 1000 で閉じられ、状態は新しいスレッドのものになる
    // given (前提条件):
    let mut backend = TestBackend::start().await;
    let mut client = client(&backend, Duration::from_secs(30));
    let mut rx = client.subscribe();
    client.connect(Some("abc")).await;
    let mut old = backend.accept().await;
    wait_for(&mut rx, |s| s.is_connected()).await;
    old.send_text(r#"{"event":"new_message","message":{"id":"m1","content":"old thread"}}"#)
        .await;
    wait_for(&mut rx, |s| !s.messages.is_empty()).await;

    // when (操作):
    client.connect(Some("xyz")).await;
    let new = backend.accept().await;
    let snapshot = wait_for(&mut rx, |s| s.is_connected()).await;

    // then (期待する結果):
    assert_eq!(old.recv_close().await, Some(CLOSE_NORMAL));
    assert_eq!(new.thread_id, "xyz");
    assert_eq!(snapshot.thread_id.map(|id| id.to_string()).as_deref(), Some("xyz"));
    assert!(snapshot.messages.is_empty());
}

#[tokio::test]
async fn test_send_after_disconnect_is_rejected() {
    // テスト項目: disconnect 後の送信は NotConnected で失敗する
    // given (前提条件):
    let mut backend = TestBackend::start().await;
    let mut client = client(&backend, Duration::from_secs(30));
    let mut rx = client.subscribe();
    client.connect(Some("abc")).await;
    let mut server = backend.accept().await;
    wait_for(&mut rx, |s| s.is_connected()).await;

    // when (操作):
    client.disconnect().await;
    let result = client.send_message("too late").await;

    // then (期待する結果):
    assert_eq!(server.recv_close().await, Some(CLOSE_NORMAL));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Not connected"
    );
}
