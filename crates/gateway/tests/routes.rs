//! Integration tests for the HTTP routes, served on an ephemeral port.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use {
    async_trait::async_trait,
    bytes::Bytes,
    serde_json::Value,
    tokio::net::TcpListener,
    tokio_util::sync::CancellationToken,
};

use {
    courier_gateway::{AppState, LIVENESS_TEXT, build_app, serve_on},
    courier_relay::{
        Attachment, AttachmentFetcher, DeliverySink, DeliveryUnit, Error, EventId, EventSource,
        Flusher, HistoryPoller, PendingQueue, Result, SourceEvent, TextUnit,
    },
};

#[derive(Default)]
struct Recorder {
    texts: Mutex<Vec<String>>,
}

#[async_trait]
impl DeliverySink for Recorder {
    async fn send_text(&self, body: &str) -> Result<()> {
        self.texts.lock().unwrap().push(body.to_string());
        Ok(())
    }

    async fn send_photo(&self, _image: Bytes, caption: &str) -> Result<()> {
        self.texts.lock().unwrap().push(format!("photo:{caption}"));
        Ok(())
    }
}

struct NoFetch;

#[async_trait]
impl AttachmentFetcher for NoFetch {
    async fn fetch(&self, attachment: &Attachment) -> Result<Bytes> {
        Err(Error::fetch(&attachment.url, "offline"))
    }
}

struct EmptyChannel;

#[async_trait]
impl EventSource for EmptyChannel {
    async fn latest_id(&self) -> Result<Option<EventId>> {
        Ok(Some(900))
    }

    async fn events_after(&self, _after: Option<EventId>) -> Result<Vec<SourceEvent>> {
        Ok(Vec::new())
    }
}

struct TestServer {
    addr: SocketAddr,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start(state: AppState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(serve_on(listener, build_app(state), cancel.clone()));
        Self {
            addr,
            cancel,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn stop(self) {
        self.cancel.cancel();
        self.handle.await.unwrap().unwrap();
    }
}

fn queued_state() -> (AppState, Arc<PendingQueue>, Arc<Recorder>) {
    let queue = Arc::new(PendingQueue::new());
    let sink = Arc::new(Recorder::default());
    let flusher = Arc::new(Flusher::new(Arc::clone(&queue), sink.clone()));
    (AppState::queued(flusher), queue, sink)
}

#[tokio::test]
async fn liveness_route_answers_plain_text() {
    let server = TestServer::start(AppState::immediate()).await;

    let resp = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"), "{content_type}");
    assert_eq!(resp.text().await.unwrap(), LIVENESS_TEXT);

    server.stop().await;
}

#[tokio::test]
async fn flush_on_empty_queue_forwards_nothing() {
    let (state, _queue, sink) = queued_state();
    let server = TestServer::start(state).await;

    let resp = reqwest::Client::new()
        .post(server.url("/flush"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "no messages to forward");
    assert!(sink.texts.lock().unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn flush_drains_queue_in_order() {
    let (state, queue, sink) = queued_state();
    queue
        .append([
            DeliveryUnit::from(TextUnit::new("<b>alice</b>:\none")),
            DeliveryUnit::from(TextUnit::new("<b>bob</b>:\ntwo")),
        ])
        .await;
    let server = TestServer::start(state).await;

    let health: Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["mode"], "queued");
    assert_eq!(health["pending"], 2);

    let body: Value = reqwest::get(server.url("/flush"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["message"], "forwarded 2 messages");
    assert_eq!(body["forwarded"], 2);
    assert_eq!(*sink.texts.lock().unwrap(), vec![
        "<b>alice</b>:\none".to_string(),
        "<b>bob</b>:\ntwo".to_string(),
    ]);
    assert!(queue.is_empty().await);

    server.stop().await;
}

#[tokio::test]
async fn flush_outside_queued_mode_is_a_server_error() {
    let server = TestServer::start(AppState::immediate()).await;

    let resp = reqwest::Client::new()
        .post(server.url("/flush"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("immediate"));

    server.stop().await;
}

#[tokio::test]
async fn health_in_poll_mode_reports_cursor() {
    let poller = Arc::new(HistoryPoller::new(
        Arc::new(EmptyChannel),
        Arc::new(NoFetch),
        Arc::new(Recorder::default()),
    ));
    poller.poll_once().await.unwrap();
    let server = TestServer::start(AppState::polling(poller)).await;

    let health: Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["mode"], "poll");
    assert_eq!(health["pending"], 0);
    assert_eq!(health["last_processed_id"], 900);

    server.stop().await;
}
