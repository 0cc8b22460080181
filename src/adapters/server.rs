use crate::adapters::shopify::ShopifyClient;
use crate::adapters::stream::event_channel;
use crate::config::AppConfig;
use crate::core::connection::connection_report;
use crate::core::processor::{ArticleProcessor, RunOptions};
use crate::core::rate_limit::IntervalLimiter;
use crate::domain::model::{ConnectionRequest, ConnectionResponse, ProcessRequest};
use crate::utils::error::{FixerError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tokio::runtime::Handle;

const EVENT_STREAM_HEAD: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/event-stream\r\n\
Cache-Control: no-cache\r\n\
Transfer-Encoding: chunked\r\n\
Connection: close\r\n\
\r\n";

/// HTTP 入口：`POST /api/process`、`POST /api/test-connection`、`GET /health`
pub struct SeoServer {
    server: Arc<tiny_http::Server>,
    config: Arc<AppConfig>,
}

/// 讓阻塞中的 accept 迴圈結束
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<tiny_http::Server>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.server.unblock();
    }
}

impl SeoServer {
    pub fn bind(config: AppConfig) -> Result<Self> {
        let server = tiny_http::Server::http(config.bind()).map_err(|e| FixerError::ServerError {
            message: format!("failed to bind {}: {}", config.bind(), e),
        })?;

        Ok(Self {
            server: Arc::new(server),
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
        }
    }

    /// 在 blocking 執行緒上接收連線，每個請求各自一條執行緒
    pub async fn serve(self) -> Result<()> {
        let handle = Handle::current();
        if let Some(addr) = self.local_addr() {
            tracing::info!("🌐 Listening on http://{}", addr);
        }

        tokio::task::spawn_blocking(move || {
            for request in self.server.incoming_requests() {
                let config = Arc::clone(&self.config);
                let handle = handle.clone();
                std::thread::spawn(move || handle_request(request, &config, &handle));
            }
            tracing::info!("🛑 Server stopped accepting connections");
        })
        .await
        .map_err(|e| FixerError::ServerError {
            message: format!("accept loop panicked: {}", e),
        })
    }
}

fn handle_request(request: Request, config: &AppConfig, handle: &Handle) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("").to_string();
    tracing::info!("📥 {} {}", method, path);

    let result = match (&method, path.as_str()) {
        (Method::Get, "/health") => {
            respond_json(request, 200, &serde_json::json!({"status": "ok"}))
        }
        (Method::Post, "/api/process") => handle_process(request, config, handle),
        (Method::Post, "/api/test-connection") => handle_test_connection(request, config, handle),
        _ => respond_json(request, 404, &serde_json::json!({"error": "not found"})),
    };

    if let Err(e) = result {
        tracing::warn!("⚠️ Failed to write response for {} {}: {}", method, path, e);
    }
}

fn handle_process(
    mut request: Request,
    config: &AppConfig,
    handle: &Handle,
) -> std::io::Result<()> {
    let prepared = read_json_body::<ProcessRequest>(&mut request).and_then(|body| {
        let limit = config.resolve_limit(body.limit)?;
        let client = ShopifyClient::new(
            &body.store_url,
            &body.access_token,
            config.api_version(),
            config.request_timeout(),
        )?;
        Ok((body.mode, limit, client))
    });

    let (mode, limit, client) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::warn!("⚠️ Rejected process request: {}", e);
            return respond_json(request, 400, &serde_json::json!({"error": e.to_string()}));
        }
    };

    let options = RunOptions {
        store: client.base_url().to_string(),
        mode,
        limit,
    };
    let processor = ArticleProcessor::new(client, IntervalLimiter::new(config.write_interval()));
    let (sink, stream) = event_channel();

    // 任務結束時 sink 被釋放，串流隨之結束
    handle.spawn(async move {
        processor.stream(&options, &sink).await;
    });

    // tiny_http 的 chunked encoder 會累積到緩衝區滿才送出，這裡自行逐框寫出
    let mut writer = request.into_writer();
    writer.write_all(EVENT_STREAM_HEAD.as_bytes())?;
    writer.flush()?;
    let frames = stream.write_chunked(&mut writer)?;
    tracing::debug!("📤 Streamed {} progress frame(s)", frames);
    Ok(())
}

fn handle_test_connection(
    mut request: Request,
    config: &AppConfig,
    handle: &Handle,
) -> std::io::Result<()> {
    let body = match read_json_body::<ConnectionRequest>(&mut request) {
        Ok(body) => body,
        Err(e) => return respond_json(request, 400, &serde_json::json!({"error": e.to_string()})),
    };

    let report = match ShopifyClient::new(
        &body.store_url,
        &body.access_token,
        config.api_version(),
        config.request_timeout(),
    ) {
        Ok(client) => handle.block_on(connection_report(&client)),
        Err(e) => ConnectionResponse {
            success: false,
            shop: None,
            error: Some(e.to_string()),
        },
    };

    respond_json(request, 200, &report)
}

fn read_json_body<T: DeserializeOwned>(request: &mut Request) -> Result<T> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body)?;
    serde_json::from_str(&body).map_err(|e| FixerError::InvalidRequestError {
        message: format!("invalid JSON body: {}", e),
    })
}

fn respond_json<T: Serialize>(request: Request, status: u16, body: &T) -> std::io::Result<()> {
    let payload = serde_json::to_string(body).map_err(std::io::Error::other)?;
    let mut response = Response::from_string(payload).with_status_code(StatusCode(status));
    if let Ok(header) = "Content-Type: application/json".parse::<Header>() {
        response = response.with_header(header);
    }
    request.respond(response)
}
