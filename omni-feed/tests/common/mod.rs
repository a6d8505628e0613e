//! In-process stand-ins for the REST conversation store and the socket endpoint.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use omni_feed::{ConversationApi, Operator, Session};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// A request the store received: path, JSON body and Authorization header
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub body: Value,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
pub struct StoreState {
    pub recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl StoreState {
    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    fn record(&self, path: &str, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.recorded.lock().unwrap().push(Recorded {
            path: path.to_string(),
            body,
            authorization,
        });
    }
}

async fn list_conversations() -> Json<Value> {
    Json(json!([
        {
            "_id": "c1", "user_id": "573001112233", "name": "Ana", "platform": "whatsapp",
            "last_message": "¿Tienen envío?", "timestamp": "2025-03-01T10:00:00-05:00", "unread": 2
        },
        {
            "_id": "c2", "user_id": "ig-77", "name": null, "platform": "instagram",
            "last_message": "Gracias", "timestamp": "2025-03-01T09:00:00-05:00", "unread": 0
        },
        {
            "_id": "c3", "user_id": "psid-5", "name": "Luis", "platform": "messenger",
            "last_message": "hola", "timestamp": "2025-03-01T08:00:00-05:00", "unread": 1
        },
        { "_id": "c4", "name": "Sin usuario", "platform": "whatsapp", "unread": 0 },
        {
            "_id": "c5", "user_id": "tt-1", "name": "Sofía", "platform": "tiktok",
            "last_message": "wow", "timestamp": null, "unread": 1
        }
    ]))
}

async fn messages(Path(user_id): Path<String>) -> Result<Json<Value>, StatusCode> {
    match user_id.as_str() {
        "missing" => Err(StatusCode::NOT_FOUND),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(Json(json!({"_id": "slow-c", "messages": [
                {"sender": "user", "content": "tarde", "timestamp": "t"}
            ]})))
        }
        _ => Ok(Json(json!({
            "_id": format!("{}-conv", user_id),
            "user_id": user_id,
            "messages": [
                {"sender": "user", "content": "hola", "timestamp": "2025-03-01T09:58:00-05:00"},
                {"sender": "bot", "content": "¡Hola! ¿En qué te ayudo?", "timestamp": "2025-03-01T09:59:00-05:00"},
                {"sender": "user", "content": "¿Tienen envío?", "timestamp": "2025-03-01T10:00:00-05:00"}
            ]
        }))),
    }
}

async fn send_whatsapp(
    State(state): State<StoreState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record("/whatsapp/whatsapp/send-message", &headers, body);
    Json(json!({"status": "sent"}))
}

async fn send_instagram(
    State(state): State<StoreState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record("/instagram/send", &headers, body);
    Json(json!({"status": "sent"}))
}

async fn send_facebook(
    State(state): State<StoreState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record("/facebook/send/messenger", &headers, body);
    Json(json!({"status": "sent"}))
}

async fn mark_managed(Path(id): Path<String>) -> Json<Value> {
    if id.starts_with('c') {
        Json(json!({"status": "ok", "contact_id": id, "gestionado": true}))
    } else {
        Json(json!({"status": "not_found", "contact_id": id}))
    }
}

/// Start the store on a random port and return its base URL
pub async fn start_store() -> (String, StoreState, tokio::task::JoinHandle<()>) {
    let state = StoreState::default();
    let app = Router::new()
        .route("/conversations/get-conversations/", get(list_conversations))
        .route("/conversations/conversations/messages/{user_id}", get(messages))
        .route("/whatsapp/whatsapp/send-message", post(send_whatsapp))
        .route("/instagram/send", post(send_instagram))
        .route("/facebook/send/messenger", post(send_facebook))
        .route("/conversations/contacts/{id}/gestionado", post(mark_managed))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{}/", port), state, handle)
}

/// Start a socket endpoint that pushes every frame sent on the returned channel
pub async fn start_socket() -> (String, mpsc::UnboundedSender<Value>, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();

    let handle = tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };
        while let Some(frame) = rx.recv().await {
            if ws.send(Message::Text(frame.to_string().into())).await.is_err() {
                break;
            }
        }
        while let Some(Ok(_)) = ws.next().await {}
    });

    (format!("ws://127.0.0.1:{}", port), tx, handle)
}

pub fn session(role: &str, token: Option<&str>) -> Session {
    Session::new(
        token.map(String::from),
        Operator {
            name: "Laura".to_string(),
            role: role.to_string(),
        },
    )
}

pub fn api(base: &str, role: &str) -> ConversationApi {
    ConversationApi::new(base, session(role, Some("test-token")), Duration::from_secs(5)).unwrap()
}
