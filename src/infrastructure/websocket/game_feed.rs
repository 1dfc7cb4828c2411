use std::cell::RefCell;
use std::rc::Rc;
use std::task::Poll;
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{Either, poll_fn, select};
use futures::{FutureExt, Sink, StreamExt};
use gloo_net::websocket::futures::WebSocket;
use gloo_net::websocket::{Message, State};
use gloo_timers::future::sleep;
use wasm_bindgen_futures::spawn_local;

use crate::config::FeedConfig;
use crate::domain::feed::{ConnectionState, FeedConnection, FeedHandlers, FeedParams, HandlerCell};
use crate::domain::logging::{LogComponent, get_logger};

const COMPONENT: LogComponent = LogComponent::Infrastructure("GameFeed");

/// One reconnecting connection to a game's live feed.
///
/// Dropping the client tears the connection down: the socket is closed and
/// no reconnect is ever scheduled again.
pub struct LiveFeedClient {
    connection: Rc<RefCell<FeedConnection>>,
    handlers: HandlerCell,
    shutdown: Option<oneshot::Sender<()>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Closed,
    Shutdown,
}

enum Opening {
    Ready,
    Failed,
    Shutdown,
}

fn now_ms() -> f64 {
    js_sys::Date::now()
}

impl LiveFeedClient {
    /// Start connecting. Without params (empty game id) the client stays
    /// disconnected and inert.
    pub fn connect(params: Option<FeedParams>, config: FeedConfig, handlers: FeedHandlers) -> Self {
        let mut client = Self {
            connection: Rc::new(RefCell::new(FeedConnection::new(
                config.reconnect_delay_ms as f64,
            ))),
            handlers: HandlerCell::new(handlers),
            shutdown: None,
        };

        let Some(params) = params else {
            get_logger().debug(COMPONENT, "no game id, live feed not started");
            return client;
        };
        if !client.connection.borrow_mut().begin() {
            return client;
        }

        let url = params.endpoint_url(&config);
        let (tx, rx) = oneshot::channel();
        client.shutdown = Some(tx);
        spawn_local(run_feed(url, client.connection.clone(), client.handlers.clone(), rx));
        client
    }

    /// Swap the handler set; the next dispatched message uses the new one.
    pub fn set_handlers(&self, handlers: FeedHandlers) {
        self.handlers.replace(handlers);
    }

    pub fn connected(&self) -> bool {
        self.connection.borrow().connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.borrow().state()
    }

    /// Idempotent; safe before the socket ever opened.
    pub fn teardown(&mut self) {
        let first = self.connection.borrow_mut().teardown();
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if first {
            get_logger().info(COMPONENT, "live feed torn down");
        }
    }
}

impl Drop for LiveFeedClient {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn run_feed(
    url: String,
    connection: Rc<RefCell<FeedConnection>>,
    handlers: HandlerCell,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        if run_session(&url, &connection, &handlers, &mut shutdown).await == SessionEnd::Shutdown {
            return;
        }

        let retry_at = connection.borrow_mut().on_closed(now_ms());
        handlers.notify_connection(false);
        let Some(retry_at) = retry_at else {
            return;
        };
        get_logger().warn(
            COMPONENT,
            &format!("connection lost, retrying in {:.0} ms", retry_at - now_ms()),
        );

        // The timer may fire a hair before the wall clock agrees.
        loop {
            let wait = (retry_at - now_ms()).max(1.0);
            let timer = Box::pin(sleep(Duration::from_millis(wait as u64)));
            if let Either::Right(_) = select(timer, &mut shutdown).await {
                return;
            }
            if connection.borrow_mut().take_due_reconnect(now_ms()) {
                break;
            }
            if connection.borrow().is_torn_down() {
                return;
            }
        }
    }
}

async fn run_session(
    url: &str,
    connection: &Rc<RefCell<FeedConnection>>,
    handlers: &HandlerCell,
    shutdown: &mut oneshot::Receiver<()>,
) -> SessionEnd {
    get_logger().info(COMPONENT, &format!("🔌 connecting to {}", redact_token(url)));
    let mut ws = match WebSocket::open(url) {
        Ok(ws) => ws,
        Err(e) => {
            get_logger().error(COMPONENT, &format!("❌ failed to open socket: {e:?}"));
            return SessionEnd::Closed;
        }
    };

    // The sink becomes ready on open; a failed handshake ends the stream.
    let opening = poll_fn(|cx| {
        if shutdown.poll_unpin(cx).is_ready() {
            return Poll::Ready(Opening::Shutdown);
        }
        match Sink::<Message>::poll_ready(std::pin::Pin::new(&mut ws), cx) {
            Poll::Ready(Ok(())) => return Poll::Ready(Opening::Ready),
            Poll::Ready(Err(_)) => return Poll::Ready(Opening::Failed),
            Poll::Pending => {}
        }
        match ws.poll_next_unpin(cx) {
            Poll::Ready(_) => Poll::Ready(Opening::Failed),
            Poll::Pending => Poll::Pending,
        }
    })
    .await;

    match opening {
        Opening::Shutdown => {
            let _ = ws.close(Some(1000), Some("teardown"));
            return SessionEnd::Shutdown;
        }
        Opening::Failed => return SessionEnd::Closed,
        Opening::Ready if !matches!(ws.state(), State::Open) => return SessionEnd::Closed,
        Opening::Ready => {}
    }

    connection.borrow_mut().on_open();
    handlers.notify_connection(true);
    get_logger().info(COMPONENT, "✅ live feed open");

    loop {
        let next = match select(ws.next(), &mut *shutdown).await {
            Either::Left((item, _)) => Some(item),
            Either::Right(_) => None,
        };
        match next {
            None => {
                let _ = ws.close(Some(1000), Some("teardown"));
                return SessionEnd::Shutdown;
            }
            Some(None) => return SessionEnd::Closed,
            Some(Some(Ok(Message::Text(text)))) => {
                if !handlers.dispatch_text(&text) {
                    crate::log_trace!(COMPONENT, "dropped malformed frame: {text}");
                }
            }
            Some(Some(Ok(Message::Bytes(bytes)))) => match String::from_utf8(bytes) {
                Ok(text) => {
                    handlers.dispatch_text(&text);
                }
                Err(_) => get_logger().debug(COMPONENT, "dropped binary frame"),
            },
            Some(Some(Err(e))) => {
                crate::log_warn!(COMPONENT, "socket error: {e:?}");
                return SessionEnd::Closed;
            }
        }
    }
}

/// Endpoint URL safe for logs.
pub fn redact_token(url: &str) -> String {
    match url.find("token=") {
        Some(pos) => {
            let end = url[pos..].find('&').map_or(url.len(), |i| pos + i);
            format!("{}token=***{}", &url[..pos], &url[end..])
        }
        None => url.to_string(),
    }
}
