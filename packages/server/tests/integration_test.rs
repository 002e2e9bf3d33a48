//! Integration tests running the full axum server in-process.
//!
//! WebSocket クライアントは tokio-tungstenite、内部 HTTP API は reqwest で
//! 叩き、ワイヤフォーマットそのままの挙動を検証する。

use std::{collections::HashMap, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::Mutex};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use tsubame_server::{
    domain::{ConnectionRegistry, Conversation, ConversationId, RoomDirectory, TypingBoard, UserId},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryConversationRepository,
    },
    ui::Server,
    usecase::{
        ActiveChatUseCase, ConnectUseCase, DisconnectUseCase, GetPresenceStateUseCase,
        MarkSeenUseCase, MembershipChangedUseCase, NotifyMessageUseCase, PresenceBroadcastUseCase,
        TypingUseCase,
    },
};
use tsubame_shared::time::SystemClock;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// In-process test server with a handle to its repository for seeding
struct TestServer {
    addr: std::net::SocketAddr,
    repository: Arc<InMemoryConversationRepository>,
}

impl TestServer {
    /// Start the full server on an ephemeral port
    async fn start() -> Self {
        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let rooms = Arc::new(Mutex::new(RoomDirectory::new()));
        let typing = Arc::new(Mutex::new(TypingBoard::new()));
        let repository = Arc::new(InMemoryConversationRepository::new());
        let pusher_connections = Arc::new(Mutex::new(HashMap::new()));
        let message_pusher = Arc::new(WebSocketMessagePusher::new(pusher_connections));

        let server = Server::new(
            Arc::new(ConnectUseCase::new(
                registry.clone(),
                rooms.clone(),
                repository.clone(),
                message_pusher.clone(),
            )),
            Arc::new(DisconnectUseCase::new(
                registry.clone(),
                rooms.clone(),
                typing.clone(),
                message_pusher.clone(),
            )),
            Arc::new(ActiveChatUseCase::new(registry.clone())),
            Arc::new(TypingUseCase::new(
                registry.clone(),
                rooms.clone(),
                typing.clone(),
                message_pusher.clone(),
            )),
            Arc::new(MarkSeenUseCase::new(
                registry.clone(),
                rooms.clone(),
                repository.clone(),
                message_pusher.clone(),
            )),
            Arc::new(NotifyMessageUseCase::new(
                registry.clone(),
                rooms.clone(),
                repository.clone(),
                message_pusher.clone(),
            )),
            Arc::new(MembershipChangedUseCase::new(
                registry.clone(),
                rooms.clone(),
                repository.clone(),
            )),
            Arc::new(PresenceBroadcastUseCase::new(
                registry.clone(),
                message_pusher.clone(),
            )),
            Arc::new(GetPresenceStateUseCase::new(
                registry,
                rooms,
                typing,
                Arc::new(SystemClock),
            )),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        tokio::spawn(async move {
            axum::serve(listener, server.router())
                .await
                .expect("Test server crashed");
        });

        TestServer { addr, repository }
    }

    async fn seed_conversation(&self, conversation_id: &str, participants: &[&str]) {
        let id = ConversationId::new(conversation_id.to_string()).unwrap();
        let participant_ids = participants
            .iter()
            .map(|p| UserId::new(p.to_string()).unwrap())
            .collect();
        self.repository
            .upsert_conversation(Conversation::new(id, participant_ids))
            .await;
    }

    async fn connect_ws(&self, user_id: &str) -> WsClient {
        let url = format!("ws://{}/ws?userId={}", self.addr, user_id);
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("Failed to connect WebSocket");
        ws
    }

    /// 接続し、接続完了（レジストリ登録とルーム参加）を示す最初の
    /// online-users イベントまで読み進める
    async fn connect_ws_ready(&self, user_id: &str) -> WsClient {
        let mut ws = self.connect_ws(user_id).await;
        recv_event(&mut ws, "online-users").await;
        ws
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// イベントが届くまで読み進め、指定した type のイベントを返す
async fn recv_event(ws: &mut WsClient, event_type: &str) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .unwrap_or_else(|_| panic!("Timed out waiting for '{}' event", event_type))
            .expect("WebSocket stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            let event: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            if event["type"] == event_type {
                return event;
            }
        }
    }
}

/// 指定した type のイベントが届かないことを確認する（短いタイムアウト）
async fn assert_no_event(ws: &mut WsClient, event_type: &str) {
    let deadline = tokio::time::sleep(Duration::from_millis(300));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => return,
            msg = ws.next() => {
                let msg = msg.expect("WebSocket stream ended").expect("WebSocket error");
                if let Message::Text(text) = msg {
                    let event: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
                    assert_ne!(
                        event["type"], event_type,
                        "Unexpected '{}' event: {}", event_type, event
                    );
                }
            }
        }
    }
}

async fn send_signal(ws: &mut WsClient, payload: serde_json::Value) {
    ws.send(Message::Text(payload.to_string().into()))
        .await
        .expect("Failed to send signal");
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックエンドポイントが 200 を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = reqwest::get(server.http_url("/api/health")).await.unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_invalid_user_id_is_rejected() {
    // テスト項目: 空の userId での WebSocket 接続は拒否される
    // given (前提条件):
    let server = TestServer::start().await;
    let url = format!("ws://{}/ws?userId=%20", server.addr);

    // when (操作):
    let result = tokio_tungstenite::connect_async(url).await;

    // then (期待する結果):
    assert!(result.is_err(), "Connection with blank userId should fail");
}

#[tokio::test]
async fn test_presence_broadcast_on_connect_and_disconnect() {
    // テスト項目: 接続・切断のたびに全量の online-users が配信される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_ws("alice").await;
    let event = recv_event(&mut alice, "online-users").await;
    assert_eq!(event["userIds"], serde_json::json!(["alice"]));

    // when (操作): bob が接続
    let mut bob = server.connect_ws("bob").await;

    // then (期待する結果): 両者に完全なリストが届く
    let event = recv_event(&mut alice, "online-users").await;
    assert_eq!(event["userIds"], serde_json::json!(["alice", "bob"]));
    let event = recv_event(&mut bob, "online-users").await;
    assert_eq!(event["userIds"], serde_json::json!(["alice", "bob"]));

    // when (操作): bob が切断
    bob.close(None).await.unwrap();

    // then (期待する結果): alice に bob 抜きのリストが届く
    let event = recv_event(&mut alice, "online-users").await;
    assert_eq!(event["userIds"], serde_json::json!(["alice"]));
}

#[tokio::test]
async fn test_multi_tab_user_stays_online_until_last_tab_closes() {
    // テスト項目: 複数タブのユーザーは最後のタブが閉じるまでオンライン
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_ws("alice").await;
    recv_event(&mut alice, "online-users").await;

    let mut bob_tab1 = server.connect_ws("bob").await;
    recv_event(&mut alice, "online-users").await;
    recv_event(&mut bob_tab1, "online-users").await;
    let mut bob_tab2 = server.connect_ws("bob").await;
    recv_event(&mut alice, "online-users").await;
    recv_event(&mut bob_tab2, "online-users").await;

    // when (操作): タブを 1 本だけ閉じる
    bob_tab1.close(None).await.unwrap();

    // then (期待する結果): bob はまだオンライン
    let event = recv_event(&mut alice, "online-users").await;
    assert_eq!(event["userIds"], serde_json::json!(["alice", "bob"]));

    // when (操作): 最後のタブも閉じる
    bob_tab2.close(None).await.unwrap();

    // then (期待する結果): bob がオフラインになる
    let event = recv_event(&mut alice, "online-users").await;
    assert_eq!(event["userIds"], serde_json::json!(["alice"]));
}

#[tokio::test]
async fn test_message_fanout_reaches_every_room_member_tab() {
    // テスト項目: 新着メッセージが全メンバーの全タブに一度ずつ届き、
    //             非参加者には届かない
    // given (前提条件):
    let server = TestServer::start().await;
    server.seed_conversation("c1", &["alice", "bob"]).await;
    let mut alice_tab1 = server.connect_ws_ready("alice").await;
    let mut alice_tab2 = server.connect_ws_ready("alice").await;
    let mut bob = server.connect_ws_ready("bob").await;
    let mut mallory = server.connect_ws_ready("mallory").await;

    // when (操作): REST 層が永続化済みメッセージを通知
    let client = reqwest::Client::new();
    let response = client
        .post(server.http_url("/internal/messages"))
        .json(&serde_json::json!({
            "conversationId": "c1",
            "message": {"id": "m1", "senderId": "alice", "body": "hello"}
        }))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), 202);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["deliveredTo"], 3);

    for ws in [&mut alice_tab1, &mut alice_tab2, &mut bob] {
        let event = recv_event(ws, "new-message").await;
        assert_eq!(event["conversationId"], "c1");
        assert_eq!(event["message"]["body"], "hello");
    }
    assert_no_event(&mut mallory, "new-message").await;
}

#[tokio::test]
async fn test_typing_events_skip_the_typist() {
    // テスト項目: typing-start / typing-stop が入力者以外にだけ届く
    // given (前提条件):
    let server = TestServer::start().await;
    server.seed_conversation("c1", &["alice", "bob"]).await;
    let mut alice = server.connect_ws_ready("alice").await;
    let mut bob = server.connect_ws_ready("bob").await;

    // when (操作): alice が入力開始
    send_signal(
        &mut alice,
        serde_json::json!({
            "type": "typing-start",
            "conversationId": "c1",
            "userId": "alice",
            "userName": "Alice"
        }),
    )
    .await;

    // then (期待する結果): bob にだけ届く
    let event = recv_event(&mut bob, "typing-start").await;
    assert_eq!(event["conversationId"], "c1");
    assert_eq!(event["userId"], "alice");
    assert_eq!(event["userName"], "Alice");
    assert_no_event(&mut alice, "typing-start").await;

    // when (操作): alice が入力終了
    send_signal(
        &mut alice,
        serde_json::json!({
            "type": "typing-stop",
            "conversationId": "c1",
            "userId": "alice"
        }),
    )
    .await;

    // then (期待する結果):
    let event = recv_event(&mut bob, "typing-stop").await;
    assert_eq!(event["userId"], "alice");
}

#[tokio::test]
async fn test_disconnect_while_typing_broadcasts_stop() {
    // テスト項目: 入力中のまま切断したユーザーの typing-stop が配信される
    // given (前提条件):
    let server = TestServer::start().await;
    server.seed_conversation("c1", &["alice", "bob"]).await;
    let mut alice = server.connect_ws_ready("alice").await;
    let mut bob = server.connect_ws_ready("bob").await;

    send_signal(
        &mut alice,
        serde_json::json!({
            "type": "typing-start",
            "conversationId": "c1",
            "userId": "alice",
            "userName": "Alice"
        }),
    )
    .await;
    recv_event(&mut bob, "typing-start").await;

    // when (操作): alice が入力中のまま切断
    alice.close(None).await.unwrap();

    // then (期待する結果): bob に typing-stop が届く
    let event = recv_event(&mut bob, "typing-stop").await;
    assert_eq!(event["conversationId"], "c1");
    assert_eq!(event["userId"], "alice");
}

#[tokio::test]
async fn test_mark_seen_notifies_other_members_only() {
    // テスト項目: mark-seen が本人以外のメンバーにだけ seen-update を配る
    // given (前提条件):
    let server = TestServer::start().await;
    server.seed_conversation("c1", &["alice", "bob"]).await;
    let mut alice = server.connect_ws_ready("alice").await;
    let mut bob = server.connect_ws_ready("bob").await;

    // when (操作): bob が既読にする
    send_signal(
        &mut bob,
        serde_json::json!({
            "type": "mark-seen",
            "conversationId": "c1",
            "userId": "bob"
        }),
    )
    .await;

    // then (期待する結果):
    let event = recv_event(&mut alice, "seen-update").await;
    assert_eq!(event["conversationId"], "c1");
    assert_eq!(event["userId"], "bob");
    assert_no_event(&mut bob, "seen-update").await;
}

#[tokio::test]
async fn test_viewer_gets_immediate_seen_on_new_message() {
    // テスト項目: 会話を開いているユーザーがいると、新着メッセージ直後に
    //             他のメンバーへ seen-update が届く
    // given (前提条件):
    let server = TestServer::start().await;
    server.seed_conversation("c1", &["alice", "bob"]).await;
    let mut alice = server.connect_ws_ready("alice").await;
    let mut bob = server.connect_ws_ready("bob").await;

    // bob が c1 をフォアグラウンドで開く
    send_signal(
        &mut bob,
        serde_json::json!({"type": "open-chat", "conversationId": "c1"}),
    )
    .await;
    // open-chat はブロードキャストを発生させない。同じ接続のシグナルは
    // 順番に処理されるので、typing の往復で open-chat の反映を待つ
    send_signal(
        &mut bob,
        serde_json::json!({
            "type": "typing-start",
            "conversationId": "c1",
            "userId": "bob",
            "userName": "Bob"
        }),
    )
    .await;
    recv_event(&mut alice, "typing-start").await;
    send_signal(
        &mut bob,
        serde_json::json!({"type": "typing-stop", "conversationId": "c1", "userId": "bob"}),
    )
    .await;
    recv_event(&mut alice, "typing-stop").await;

    // when (操作): alice がメッセージを送った通知が届く
    let client = reqwest::Client::new();
    client
        .post(server.http_url("/internal/messages"))
        .json(&serde_json::json!({
            "conversationId": "c1",
            "message": {"id": "m1", "senderId": "alice", "body": "hi"}
        }))
        .send()
        .await
        .unwrap();

    // then (期待する結果): alice に bob の seen-update が届く
    let event = recv_event(&mut alice, "seen-update").await;
    assert_eq!(event["userId"], "bob");
}

#[tokio::test]
async fn test_membership_change_stops_delivery_without_reconnect() {
    // テスト項目: 参加者から外れたユーザーは membership-changed 通知後、
    //             再接続なしでメッセージが届かなくなる
    // given (前提条件):
    let server = TestServer::start().await;
    server.seed_conversation("g1", &["alice", "bob"]).await;
    let mut alice = server.connect_ws_ready("alice").await;
    let mut bob = server.connect_ws_ready("bob").await;

    // bob を参加者リストから外し、変更を通知する
    server.seed_conversation("g1", &["alice"]).await;
    let client = reqwest::Client::new();
    let response = client
        .post(server.http_url("/internal/membership-changed"))
        .json(&serde_json::json!({"conversationId": "g1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["memberCount"], 1);

    // when (操作):
    client
        .post(server.http_url("/internal/messages"))
        .json(&serde_json::json!({
            "conversationId": "g1",
            "message": {"id": "m1", "senderId": "alice", "body": "secret"}
        }))
        .send()
        .await
        .unwrap();

    // then (期待する結果): alice には届き、bob には届かない
    let event = recv_event(&mut alice, "new-message").await;
    assert_eq!(event["message"]["body"], "secret");
    assert_no_event(&mut bob, "new-message").await;
}

#[tokio::test]
async fn test_malformed_frame_is_ignored() {
    // テスト項目: 不正なフレームを送っても接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_ws("alice").await;
    recv_event(&mut alice, "online-users").await;

    // when (操作): JSON ですらないフレームと未知の type を送る
    alice
        .send(Message::Text("not json at all".into()))
        .await
        .unwrap();
    send_signal(&mut alice, serde_json::json!({"type": "self-destruct"})).await;

    // then (期待する結果): 接続は生きていて、以降のイベントも届く
    let mut bob = server.connect_ws("bob").await;
    let event = recv_event(&mut alice, "online-users").await;
    assert_eq!(event["userIds"], serde_json::json!(["alice", "bob"]));
    recv_event(&mut bob, "online-users").await;
}

#[tokio::test]
async fn test_debug_presence_endpoint() {
    // テスト項目: /debug/presence が現在の状態を返す
    // given (前提条件):
    let server = TestServer::start().await;
    server.seed_conversation("c1", &["alice"]).await;
    let mut alice = server.connect_ws("alice").await;
    recv_event(&mut alice, "online-users").await;

    // when (操作):
    let state: serde_json::Value = reqwest::get(server.http_url("/debug/presence"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(state["onlineUserIds"], serde_json::json!(["alice"]));
    assert_eq!(state["rooms"][0]["conversationId"], "c1");
    assert_eq!(state["rooms"][0]["memberCount"], 1);
    // 取得時刻が RFC 3339 で入っている
    assert!(state["generatedAt"].as_str().unwrap().contains('T'));
}
