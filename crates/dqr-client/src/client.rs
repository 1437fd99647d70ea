//! Dowell QR code API client.
//!
//! - One pooled HTTP connection set per client, reused across calls
//! - Payloads validated against the per-operation field tables before I/O
//! - Image URLs in responses rewritten to the download host
//! - Observability (tracing spans, metrics)

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dqr_models::{
    correct_response_urls, file_name_from_path, ApiStatus, FieldKind, FieldValue,
    GeneratedQrCode, Payload, QrCodeRecord, QrCodeType, CREATE_FIELDS, UPDATE_FIELDS,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::error::{ClientError, ClientResult};
use crate::metrics::record_request;
use crate::options::GenerateOptions;

const LOGO_MIME: &str = "application/octet-stream";

/// A logo file ready to be attached to a multipart request.
#[derive(Debug, Clone)]
pub(crate) struct LogoPart {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl LogoPart {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    async fn from_path(path: &str) -> ClientResult<Self> {
        let normalized = path.trim().replace('\\', "/");
        let bytes = tokio::fs::read(&normalized).await?;
        Ok(Self::new(file_name_from_path(&normalized), bytes))
    }
}

fn build_http(config: &ClientConfig) -> ClientResult<Client> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .user_agent(concat!("dowell-qr/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ClientError::Network)
}

async fn fetch_status(http: &Client, base_url: &str) -> ClientResult<ApiStatus> {
    let url = format!("{}/server-status/", base_url.trim_end_matches('/'));
    let response = http.get(&url).send().await?;
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let details = if status.is_success() {
        serde_json::from_str::<Map<String, Value>>(&body).unwrap_or_else(|_| info_details(body))
    } else {
        info_details(body)
    };

    Ok(ApiStatus {
        status_code: status.as_u16(),
        details,
    })
}

fn info_details(body: String) -> Map<String, Value> {
    let mut details = Map::new();
    details.insert("info".to_string(), Value::String(body));
    details
}

/// Status of the QR code API at the configured base URL, using a one-off
/// connection.
pub async fn get_api_status() -> ClientResult<ApiStatus> {
    let config = ClientConfig::from_env();
    let http = build_http(&config)?;
    fetch_status(&http, &config.base_url).await
}

// =============================================================================
// Client
// =============================================================================

/// Handles QR code generation, update and retrieval for one user.
#[derive(Debug, Clone)]
pub struct QrClient {
    http: Client,
    config: ClientConfig,
    credentials: Credentials,
}

impl QrClient {
    pub fn new(credentials: Credentials, config: ClientConfig) -> ClientResult<Self> {
        let http = build_http(&config)?;
        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(Credentials::from_env()?, ClientConfig::from_env())
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn qrcode_url(&self, qrcode_id: &str) -> String {
        self.url(&format!("/update-qr-code/{}/", qrcode_id))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials.api_key {
            Some(key) => request.query(&[("api_key", key.as_str())]),
            None => request,
        }
    }

    fn correct_urls(&self, value: &mut Value) {
        correct_response_urls(value, &self.config.download_base_url);
    }

    /// Health of the QR code API.
    pub async fn status(&self) -> ClientResult<ApiStatus> {
        self.execute_request("get_status", None, fetch_status(&self.http, &self.config.base_url))
            .await
    }

    pub fn available_qrcode_types(&self) -> Vec<String> {
        QrCodeType::available()
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Create QR codes and return their (image url, id) pairs.
    pub async fn generate_qrcode(&self, options: &GenerateOptions) -> ClientResult<Vec<GeneratedQrCode>> {
        let records = self.generate_qrcode_verbose(options).await?;
        records
            .iter()
            .map(|record| {
                record.to_generated().ok_or_else(|| {
                    ClientError::generation(format!(
                        "QR Code {} has no `qrcode_image_url`",
                        record.qrcode_id
                    ))
                })
            })
            .collect()
    }

    /// Create QR codes and return the full records.
    pub async fn generate_qrcode_verbose(&self, options: &GenerateOptions) -> ClientResult<Vec<QrCodeRecord>> {
        options.parsed_type()?;

        let logo = match &options.logo {
            Some(path) => Some(LogoPart::from_path(&path.to_string_lossy()).await?),
            None => None,
        };

        self.create(options, logo).await
    }

    /// POST a create request. `logo` replaces any logo path in `options`.
    pub(crate) async fn create(
        &self,
        options: &GenerateOptions,
        logo: Option<LogoPart>,
    ) -> ClientResult<Vec<QrCodeRecord>> {
        let payload = options.to_payload(&self.credentials);
        payload.validate(CREATE_FIELDS)?;
        let url = self.url("/qr-code/");

        self.execute_request("generate_qrcode", None, async move {
            let form = multipart_form(&payload, logo)?;
            let response = self.authorized(self.http.post(&url)).multipart(form).send().await?;
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::generation(body));
            }

            let mut body: Value = response.json().await?;
            let mut qrcodes = body
                .get_mut("qrcodes")
                .map(Value::take)
                .filter(|v| !v.is_null())
                .ok_or_else(|| ClientError::generation("response is missing `qrcodes`"))?;
            self.correct_urls(&mut qrcodes);

            let records: Vec<QrCodeRecord> = serde_json::from_value(qrcodes)
                .map_err(|e| ClientError::generation(format!("unexpected `qrcodes`: {}", e)))?;
            if records.is_empty() {
                return Err(ClientError::generation("no QR codes were created"));
            }
            info!("Created {} QR code(s)", records.len());
            Ok(records)
        })
        .await
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Update a QR code and return its new image URL. Updates may take a
    /// while to be reflected by the API.
    pub async fn update_qrcode(&self, qrcode_id: &str, payload: Payload) -> ClientResult<String> {
        let record = self.update_qrcode_verbose(qrcode_id, payload).await?;
        image_url_of(record, ClientError::Update)
    }

    /// Update a QR code and return the updated record.
    ///
    /// A `logo` entry is read as a local file path and uploaded.
    pub async fn update_qrcode_verbose(&self, qrcode_id: &str, mut payload: Payload) -> ClientResult<QrCodeRecord> {
        payload.insert("company_id", self.credentials.user_id.clone());

        let logo = match payload.remove("logo") {
            Some(FieldValue::Text(path)) if !path.trim().is_empty() => Some(LogoPart::from_path(&path).await?),
            Some(FieldValue::Text(_)) | None => None,
            Some(other) => {
                return Err(ClientError::InvalidFieldType {
                    field: "logo".to_string(),
                    expected: FieldKind::Text,
                    found: other.kind(),
                })
            }
        };

        self.send_update(qrcode_id, payload, logo).await
    }

    /// PUT an update: multipart when a logo is attached, JSON otherwise.
    pub(crate) async fn send_update(
        &self,
        qrcode_id: &str,
        payload: Payload,
        logo: Option<LogoPart>,
    ) -> ClientResult<QrCodeRecord> {
        payload.validate(UPDATE_FIELDS)?;
        let url = self.qrcode_url(qrcode_id);

        self.execute_request("update_qrcode", Some(qrcode_id), async move {
            let request = self.authorized(self.http.put(&url));
            let request = match logo {
                Some(logo) => request.multipart(multipart_form(&payload, Some(logo))?),
                None => request.json(&payload),
            };

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::update(body));
            }

            let mut body: Value = response.json().await?;
            let mut record = body
                .get_mut("response")
                .map(Value::take)
                .filter(Value::is_object)
                .ok_or_else(|| ClientError::update("response is missing `response`"))?;
            self.correct_urls(&mut record);

            let record: QrCodeRecord = serde_json::from_value(record)
                .map_err(|e| ClientError::update(format!("unexpected `response`: {}", e)))?;
            debug!("Updated QR code {}", qrcode_id);
            Ok(record)
        })
        .await
    }

    pub async fn activate_qrcode(&self, qrcode_id: &str) -> ClientResult<()> {
        self.set_active(qrcode_id, true).await
    }

    pub async fn deactivate_qrcode(&self, qrcode_id: &str) -> ClientResult<()> {
        self.set_active(qrcode_id, false).await
    }

    async fn set_active(&self, qrcode_id: &str, active: bool) -> ClientResult<()> {
        let record = self
            .update_qrcode_verbose(qrcode_id, Payload::new().with("is_active", active))
            .await?;

        if record.is_active != active {
            return Err(ClientError::ActivationMismatch {
                qrcode_id: qrcode_id.to_string(),
                actual: record.is_active,
            });
        }

        info!(qrcode_id, active, "QR code activation changed");
        Ok(())
    }

    // =========================================================================
    // Retrieval
    // =========================================================================

    /// Image URL of a QR code.
    pub async fn get_qrcode(&self, qrcode_id: &str) -> ClientResult<String> {
        let record = self.get_qrcode_record(qrcode_id).await?;
        image_url_of(record, ClientError::Retrieval)
    }

    /// Full record of a QR code.
    pub async fn get_qrcode_record(&self, qrcode_id: &str) -> ClientResult<QrCodeRecord> {
        let url = self.qrcode_url(qrcode_id);

        self.execute_request("get_qrcode", Some(qrcode_id), async {
            let response = self.authorized(self.http.get(&url)).send().await?;
            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                return Err(ClientError::not_found(qrcode_id));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::retrieval(body));
            }

            let mut body: Value = response.json().await?;
            let mut record = match body.get_mut("response") {
                Some(Value::Array(items)) if !items.is_empty() => items.swap_remove(0),
                _ => return Err(ClientError::not_found(qrcode_id)),
            };
            self.correct_urls(&mut record);

            serde_json::from_value(record)
                .map_err(|e| ClientError::retrieval(format!("unexpected `response`: {}", e)))
        })
        .await
    }

    /// Every QR code created under this client's user id.
    pub async fn get_qrcodes(&self) -> ClientResult<Vec<QrCodeRecord>> {
        let url = self.url("/qr-code/");

        self.execute_request("get_qrcodes", None, async {
            let response = self
                .authorized(self.http.get(&url))
                .query(&[("company_id", self.credentials.user_id.as_str())])
                .send()
                .await?;
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::retrieval(body));
            }

            let mut body: Value = response.json().await?;
            let mut records = body
                .pointer_mut("/response/data")
                .map(Value::take)
                .filter(Value::is_array)
                .ok_or_else(|| ClientError::retrieval("response is missing `response.data`"))?;
            self.correct_urls(&mut records);

            serde_json::from_value(records)
                .map_err(|e| ClientError::retrieval(format!("unexpected `response.data`: {}", e)))
        })
        .await
    }

    /// Download a QR code image into `dir`, named after the URL's last path
    /// segment. Returns the written file path.
    pub async fn download_qrcode(&self, qrcode_url: &str, dir: impl AsRef<Path>) -> ClientResult<PathBuf> {
        let file_name = Url::parse(qrcode_url)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
            })
            .ok_or_else(|| ClientError::retrieval(format!("cannot derive a file name from {}", qrcode_url)))?;
        let target = dir.as_ref().join(file_name);

        self.execute_request("download_qrcode", None, async {
            let response = self.http.get(qrcode_url).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::retrieval(format!("{} failed: {}", qrcode_url, body)));
            }

            let bytes = response.bytes().await?;
            tokio::fs::create_dir_all(dir.as_ref()).await?;
            tokio::fs::write(&target, &bytes).await?;

            debug!("Downloaded {} bytes to {}", bytes.len(), target.display());
            Ok(target)
        })
        .await
    }

    /// Close the session, dropping pooled connections.
    pub fn end_session(self) {
        debug!("Ending QR code API session for {}", self.credentials.username);
    }

    // =========================================================================
    // Observability
    // =========================================================================

    async fn execute_request<T, F>(&self, operation: &str, qrcode_id: Option<&str>, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let span = if let Some(id) = qrcode_id {
            info_span!("qrcode_request", operation = %operation, qrcode_id = %id)
        } else {
            info_span!("qrcode_request", operation = %operation)
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => {
                warn!(operation, error = %e, "QR code API request failed");
                e.kind()
            }
        };
        record_request(operation, outcome, latency_ms);

        result
    }
}

fn multipart_form(payload: &Payload, logo: Option<LogoPart>) -> ClientResult<Form> {
    let mut form = Form::new();
    for (field, value) in payload.iter() {
        form = form.text(field.clone(), value.to_form_value());
    }

    if let Some(logo) = logo {
        let part = Part::bytes(logo.bytes)
            .file_name(logo.file_name)
            .mime_str(LOGO_MIME)?;
        form = form.part("logo", part);
    }
    Ok(form)
}

fn image_url_of(record: QrCodeRecord, err: fn(String) -> ClientError) -> ClientResult<String> {
    record
        .qrcode_image_url
        .ok_or_else(|| err(format!("QR Code {} has no `qrcode_image_url`", record.qrcode_id)))
}
