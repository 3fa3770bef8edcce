use std::{net::IpAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::info;
use url::Url;

const SEND_MESSAGE_ROUTE: &str = "/:bot/sendMessage";

/// A message accepted by the fake bot api.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: Option<String>,
}

/// Messages accepted so far, in the order they arrived.
#[derive(Debug, Clone, Default)]
pub struct ReceivedMessages(Arc<Mutex<Vec<ReceivedMessage>>>);

impl ReceivedMessages {
    pub async fn list(&self) -> Vec<ReceivedMessage> {
        self.0.lock().await.clone()
    }
}

/// A fake bot api bound to a random local port.
#[derive(Debug, Clone)]
pub struct TelegramTestingServer {
    pub api_base: Url,
    pub messages: ReceivedMessages,
}

/// Binds to `127.0.0.1` on a random port and serves the fake bot api in the
/// background.
pub async fn spawn(token: &str, chat_id: &str) -> anyhow::Result<TelegramTestingServer> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .context("Failed to bind to a random local port")?;
    let addr = listener.local_addr()?;

    let messages = ReceivedMessages::default();
    let router = router(token.into(), chat_id.into(), messages.clone());
    tokio::spawn(async move { axum::serve(listener, router).await });

    Ok(TelegramTestingServer {
        api_base: format!("http://{addr}/").parse()?,
        messages,
    })
}

pub async fn start_server(
    host: IpAddr,
    port: u16,
    token: String,
    chat_id: String,
) -> anyhow::Result<()> {
    info!("Starting telegram testing server on {host}:{port}");
    info!("Telegram api base: http://{host}:{port}/");
    info!("Bot token: {token:?}");
    info!("Chat id: {chat_id:?}");

    let router = router(token, chat_id, ReceivedMessages::default());

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    axum::serve(listener, router)
        .await
        .context("Failed to start HTTP server")
}

struct TelegramState {
    token: String,
    chat_id: String,
    messages: ReceivedMessages,
}

fn router(token: String, chat_id: String, messages: ReceivedMessages) -> Router<()> {
    Router::new()
        .route(SEND_MESSAGE_ROUTE, routing::post(send_message))
        .with_state(Arc::new(TelegramState {
            token,
            chat_id,
            messages,
        }))
}

#[derive(Deserialize)]
struct SendMessageRequest {
    chat_id: ChatId,
    text: String,
    parse_mode: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChatId {
    Int(i64),
    Str(String),
}

impl ChatId {
    fn into_string(self) -> String {
        match self {
            Self::Int(id) => id.to_string(),
            Self::Str(id) => id,
        }
    }
}

async fn send_message(
    State(state): State<Arc<TelegramState>>,
    Path(bot): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Response {
    if bot.strip_prefix("bot") != Some(state.token.as_str()) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let chat_id = request.chat_id.into_string();
    if chat_id != state.chat_id {
        return error(StatusCode::BAD_REQUEST, "Bad Request: chat not found");
    }

    if request.text.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Bad Request: message text is empty");
    }

    let mut messages = state.messages.0.lock().await;
    messages.push(ReceivedMessage {
        chat_id: chat_id.clone(),
        text: request.text.clone(),
        parse_mode: request.parse_mode,
    });
    let message_id = messages.len();

    Json(json!({
        "ok": true,
        "result": {
            "message_id": message_id,
            "chat": { "id": chat_id },
            "text": request.text,
        },
    }))
    .into_response()
}

fn error(status: StatusCode, description: &str) -> Response {
    let body = json!({
        "ok": false,
        "error_code": status.as_u16(),
        "description": description,
    });
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;

    async fn post(server: &TelegramTestingServer, bot: &str, body: Value) -> (StatusCode, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}{bot}/sendMessage", server.api_base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn accepts_message() {
        let server = spawn("1:tok", "42").await.unwrap();

        let (status, body) = post(
            &server,
            "bot1:tok",
            json!({"chat_id": 42, "text": "hi", "parse_mode": "MarkdownV2"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["result"]["message_id"], 1);
        assert_eq!(
            server.messages.list().await,
            [ReceivedMessage {
                chat_id: "42".into(),
                text: "hi".into(),
                parse_mode: Some("MarkdownV2".into()),
            }]
        );
    }

    #[tokio::test]
    async fn wrong_token() {
        let server = spawn("1:tok", "42").await.unwrap();

        let (status, body) = post(&server, "bot1:nope", json!({"chat_id": "42", "text": "hi"})).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({"ok": false, "error_code": 401, "description": "Unauthorized"})
        );
        assert!(server.messages.list().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_chat() {
        let server = spawn("1:tok", "42").await.unwrap();

        let (status, body) = post(&server, "bot1:tok", json!({"chat_id": "7", "text": "hi"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["description"], "Bad Request: chat not found");
    }
}
