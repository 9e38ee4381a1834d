// src/handlers/chat.rs
// DOCUMENTATION: Websocket chat relay endpoint
// PURPOSE: Upgrade /ws/chat/ and pump frames between the client and the ChatHub

use crate::services::{parse_frame, ChatHub};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::{Message, MessageStream, Session};
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// How often to send websocket Ping frames
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Silence after which a client is considered gone
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// GET /ws/chat/
pub async fn chat_ws(
    req: HttpRequest,
    body: web::Payload,
    hub: web::Data<ChatHub>,
) -> Result<HttpResponse, Error> {
    let (response, session, stream) = actix_ws::handle(&req, body)?;
    let rx = hub.subscribe();
    let hub = hub.get_ref().clone();

    log::info!("Chat client connected ({} online)", hub.client_count());
    actix_web::rt::spawn(run_session(session, stream, hub, rx));

    Ok(response)
}

/// Session loop: relays hub broadcasts out, client messages in, and keeps the link alive
async fn run_session(
    mut session: Session,
    mut stream: MessageStream,
    hub: ChatHub,
    mut rx: broadcast::Receiver<String>,
) {
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    // first tick is immediate
    ping_interval.tick().await;
    let mut last_seen = Instant::now();

    let reason = loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if last_seen.elapsed() > CLIENT_TIMEOUT {
                    break "timeout";
                }
                if session.ping(b"").await.is_err() {
                    break "closed";
                }
            }

            result = rx.recv() => {
                match result {
                    Ok(json) => {
                        if session.text(json).await.is_err() {
                            break "closed";
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("Chat client lagged, skipped {} messages", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break "hub closed",
                }
            }

            msg = stream.next() => {
                last_seen = Instant::now();
                match msg {
                    Some(Ok(Message::Text(text))) => match parse_frame(&text) {
                        Some(message) => {
                            hub.publish(&message);
                        }
                        None => log::warn!("Dropped malformed chat frame ({} bytes)", text.len()),
                    },
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break "closed";
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break "client closed",
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log::warn!("Chat protocol error: {}", e);
                        break "protocol error";
                    }
                }
            }
        }
    };

    log::info!("Chat client disconnected: {}", reason);
    let _ = session.close(None).await;
}

/// Configuration for chat routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws/chat/", web::get().to(chat_ws));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use awc::ws::{Frame, Message as WsMessage};
    use futures_util::SinkExt;

    fn chat_server(hub: ChatHub) -> actix_test::TestServer {
        actix_test::start(move || {
            App::new()
                .app_data(web::Data::new(hub.clone()))
                .configure(config)
        })
    }

    async fn wait_for_clients(hub: &ChatHub, expected: usize) {
        for _ in 0..100 {
            if hub.client_count() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(hub.client_count(), expected);
    }

    #[actix_web::test]
    async fn test_plain_get_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ChatHub::new()))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/ws/chat/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }

    #[actix_web::test]
    async fn test_relay_round_trip() {
        let hub = ChatHub::new();
        let mut srv = chat_server(hub.clone());

        let mut alice = srv.ws_at("/ws/chat/").await.unwrap();
        let mut bob = srv.ws_at("/ws/chat/").await.unwrap();
        wait_for_clients(&hub, 2).await;

        // malformed frame is dropped and the session stays up
        alice
            .send(WsMessage::Text(r#"{"msg": "wrong key"}"#.into()))
            .await
            .unwrap();
        alice
            .send(WsMessage::Text(r#"{"message": "你好"}"#.into()))
            .await
            .unwrap();

        for client in [&mut alice, &mut bob] {
            match client.next().await {
                Some(Ok(Frame::Text(bytes))) => {
                    assert_eq!(&bytes[..], r#"{"message":"你好"}"#.as_bytes());
                }
                other => panic!("unexpected frame: {:?}", other),
            }
        }

        alice.send(WsMessage::Close(None)).await.unwrap();
        match alice.next().await {
            Some(Ok(Frame::Close(_))) | None => {}
            other => panic!("expected close, got {:?}", other),
        }
        wait_for_clients(&hub, 1).await;

        // the remaining client still relays
        bob.send(WsMessage::Text(r#"{"message": "still here"}"#.into()))
            .await
            .unwrap();
        match bob.next().await {
            Some(Ok(Frame::Text(bytes))) => {
                assert_eq!(&bytes[..], r#"{"message":"still here"}"#.as_bytes());
            }
            other => panic!("unexpected frame: {:?}", other),
        }

        srv.stop().await;
    }
}
