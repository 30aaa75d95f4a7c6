//! SmartMark RPC Server: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"url":"...","title":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Event:    {"event":"state_changed", "revision":3}

use std::time::Instant;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use smartmark::app::App;
use smartmark::logging;
use smartmark::managers::bookmark_synchronizer::BookmarkSynchronizer;
use smartmark::rpc_handler::handle_method;
use smartmark::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        let elapsed = self.window_start.elapsed();
        if elapsed.as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

/// Single writer for stdout so responses and events never interleave.
fn spawn_writer() -> (UnboundedSender<Value>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let task = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = rx.recv().await {
            let mut line = message.to_string();
            line.push('\n');
            if let Err(e) = stdout.write_all(line.as_bytes()).await {
                error!(error = %e, "failed to write to stdout");
                break;
            }
            let _ = stdout.flush().await;
        }
    });
    (tx, task)
}

/// Forwards every revision bump of `sync` as a `state_changed` event.
fn spawn_state_events(sync: &BookmarkSynchronizer, out: UnboundedSender<Value>) -> JoinHandle<()> {
    let mut revisions = sync.watch_revision();
    tokio::spawn(async move {
        while revisions.changed().await.is_ok() {
            let revision = *revisions.borrow_and_update();
            if out.send(json!({"event": "state_changed", "revision": revision})).is_err() {
                break;
            }
        }
    })
}

#[tokio::main]
async fn main() {
    let mut settings_engine = SettingsEngine::new(None);
    let settings_result = settings_engine.load();
    logging::init(&settings_engine.get_settings().logging.filter);
    if let Err(e) = settings_result {
        warn!(error = %e, "failed to load settings, using defaults");
    }

    let max_per_second = settings_engine.get_settings().server.max_requests_per_second;
    let app = match App::new(settings_engine) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to initialize SmartMark");
            std::process::exit(1);
        }
    };

    let (out, writer) = spawn_writer();

    // Signal ready
    let _ = out.send(json!({"event":"ready","version":env!("CARGO_PKG_VERSION")}));
    info!(version = env!("CARGO_PKG_VERSION"), "rpc server ready");

    let mut rate_limiter = RateLimiter::new(max_per_second);
    let mut state_events: Option<JoinHandle<()>> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read stdin");
                break;
            }
        };
        if line.trim().is_empty() { continue; }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = out.send(json!({"id":null,"error":format!("parse error: {}",e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            let _ = out.send(json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));
        debug!(method, "rpc request");

        let result = handle_method(&app, method, &params).await;

        if method == "session.start" || method == "session.end" {
            if let Some(task) = state_events.take() {
                task.abort();
            }
            state_events = app.session().map(|sync| spawn_state_events(&sync, out.clone()));
        }

        let response = match result {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        let _ = out.send(response);
    }

    app.sign_out();
    if let Some(task) = state_events.take() {
        task.abort();
    }
    drop(out);
    let _ = writer.await;
    info!("rpc server stopped");
}
