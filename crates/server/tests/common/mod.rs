//! # Common Test Utilities
//!
//! `TestApp` spawns a real server on a random port. Its AI provider is either a
//! `local` provider pointed at an `httpmock::MockServer`, or any provider passed
//! in directly (typically `vizon_test_utils::MockAiProvider`). The same mock
//! server also hosts web pages for URL ingestion.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::{Method, Mock, MockServer};
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};
use uuid::Uuid;
use vizon::providers::ai::AiProvider;
use vizon_server::{
    config::{self, AppConfig},
    router,
    state::{app_state_with_provider, build_app_state, AppState},
};

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub const SALES_CSV: &str = "Region,Product,Revenue,Units\n\
                             North,Coffee,1200.5,10\n\
                             South,Tea,800,7\n\
                             North,Cake,450.25,3\n";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with the `local` provider pointed at the mock server.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(None, "").await
    }

    /// Spawns the server with extra YAML appended to the generated `config.yml`.
    pub async fn spawn_with_config(extra_yaml: &str) -> Result<Self> {
        Self::spawn_with(None, extra_yaml).await
    }

    /// Spawns the server around a ready-made provider.
    pub async fn spawn_with_provider(provider: Box<dyn AiProvider>) -> Result<Self> {
        Self::spawn_with(Some(provider), "").await
    }

    async fn spawn_with(provider: Option<Box<dyn AiProvider>>, extra_yaml: &str) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;
        let config_dir = tempdir()?;
        let config = write_config(&config_dir, &mock_server, extra_yaml)?;
        let app_state = match provider {
            Some(provider) => app_state_with_provider(config, provider)?,
            None => build_app_state(config).await?,
        };
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_session(&self) -> Result<Uuid> {
        let body: Value = self
            .client
            .post(self.url("/sessions"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let id = body["result"]["session_id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("no session_id in {body}"))?;
        Ok(Uuid::parse_str(id)?)
    }

    /// Posts a multipart upload to `/sessions/{id}/ingest/{kind}`.
    pub async fn upload(
        &self,
        id: Uuid,
        kind: &str,
        file_name: &str,
        bytes: Vec<u8>,
        hint: Option<&str>,
    ) -> Result<Response> {
        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        if let Some(hint) = hint {
            form = form.text("hint", hint.to_string());
        }
        Ok(self
            .client
            .post(self.url(&format!("/sessions/{id}/ingest/{kind}")))
            .multipart(form)
            .send()
            .await?)
    }

    pub async fn upload_csv(&self, id: Uuid, csv: &str) -> Result<Response> {
        self.upload(id, "file", "sales.csv", csv.as_bytes().to_vec(), None)
            .await
    }

    pub async fn get_json(&self, path: &str) -> Result<(u16, Value)> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }

    /// Programs a chat-completion reply for requests whose body contains `fragment`.
    pub async fn mock_completion(&self, fragment: &str, reply: &str) -> Mock<'_> {
        self.mock_server
            .mock_async(|when, then| {
                when.method(Method::POST)
                    .path(COMPLETIONS_PATH)
                    .body_contains(fragment);
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": reply}}]
                }));
            })
            .await
    }

    /// Programs a failing chat-completion response.
    pub async fn mock_completion_status(&self, status: u16, body: &str) -> Mock<'_> {
        self.mock_server
            .mock_async(|when, then| {
                when.method(Method::POST).path(COMPLETIONS_PATH);
                then.status(status).body(body);
            })
            .await
    }

    /// Serves `html` at `path` on the mock server.
    pub async fn mock_page(&self, path: &str, html: &str) -> Mock<'_> {
        self.mock_server
            .mock_async(|when, then| {
                when.method(Method::GET).path(path);
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(html);
            })
            .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn write_config(dir: &TempDir, mock_server: &MockServer, extra_yaml: &str) -> Result<AppConfig> {
    let config_path = dir.path().join("config.yml");
    let config_content = format!(
        r#"
port: 0
provider:
  kind: "local"
  api_url: "{}"
  api_key: null
  model_name: "mock-chat-model"
  timeout_secs: 5
web:
  timeout_secs: 5
{extra_yaml}
"#,
        mock_server.url(COMPLETIONS_PATH)
    );
    let mut file = File::create(&config_path)?;
    file.write_all(config_content.as_bytes())?;

    let path = config_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("non-UTF-8 temp path"))?;
    Ok(config::get_config(Some(path))?)
}

/// Encodes a tiny PNG for image uploads.
pub fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("PNG encoding");
    buf
}
