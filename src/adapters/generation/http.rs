//! HTTP generation service
//!
//! POSTs the packet as JSON and reads back a template. The payload is
//! serialized once; the firewall checks that value and the same value is
//! sent, so nothing can change between the check and the wire.

use super::GenerationService;
use crate::boundary::Firewall;
use crate::config::{GenerationConfig, SecretString};
use crate::domain::{BoundaryError, DeidentifiedPacket, GenerationError, Result, TemplateText};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde_json::Value;
use uuid::Uuid;

/// Correlation header attached to every request
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Longest server message kept in an error
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Generation service reached over HTTP(S)
///
/// One attempt per call; retrying is left to the caller.
///
/// # Example
///
/// ```no_run
/// use phi_boundary::adapters::generation::{GenerationService, HttpGenerationService};
/// use phi_boundary::boundary::{Deidentifier, DeidentifyOptions, Firewall, PhiClassifier};
/// use phi_boundary::config::GenerationConfig;
/// use phi_boundary::domain::LocalClinicalRecord;
///
/// # async fn example() -> phi_boundary::domain::Result<()> {
/// let config = GenerationConfig {
///     endpoint: Some("https://letters.example.com/v1/generate".to_string()),
///     ..Default::default()
/// };
/// let classifier = PhiClassifier::new().map_err(|e| {
///     phi_boundary::domain::BoundaryError::Configuration(e.to_string())
/// })?;
/// let service = HttpGenerationService::new(
///     &config,
///     Firewall::new(classifier.clone()),
///     vec!["facility_id".to_string(), "audit".to_string()],
/// )?;
///
/// let packet = Deidentifier::new(classifier, "phi-boundary/1.0.0").deidentify(
///     "fac-1",
///     &LocalClinicalRecord::default(),
///     &DeidentifyOptions::default(),
/// );
/// let template = service.generate(&packet).await?;
/// println!("{}", template.as_str());
/// # Ok(())
/// # }
/// ```
pub struct HttpGenerationService {
    endpoint: String,
    api_key: Option<SecretString>,
    client: Client,
    firewall: Firewall,
    skip_keys: Vec<String>,
}

impl HttpGenerationService {
    /// Create a service for `config.endpoint`
    ///
    /// # Errors
    ///
    /// [`BoundaryError::Configuration`] when no endpoint is configured or the
    /// HTTP client cannot be built
    pub fn new(config: &GenerationConfig, firewall: Firewall, skip_keys: Vec<String>) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                BoundaryError::Configuration("generation.endpoint is not configured".to_string())
            })?;

        let client = ClientBuilder::new()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| {
                BoundaryError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            client,
            firewall,
            skip_keys,
        })
    }

    async fn send(&self, payload: &Value, request_id: &Uuid) -> Result<String> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .header(ACCEPT, "application/json, text/plain")
            .json(payload);

        if let Some(ref key) = self.api_key {
            let token: &str = key.expose_secret().as_ref();
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let body = response.text().await.map_err(map_transport_error)?;

        if status.is_server_error() {
            return Err(GenerationError::ServerError {
                status: status.as_u16(),
                message: truncate(&body),
            }
            .into());
        }
        if status.is_client_error() {
            return Err(GenerationError::ClientError {
                status: status.as_u16(),
                message: truncate(&body),
            }
            .into());
        }
        if !status.is_success() {
            return Err(
                GenerationError::InvalidResponse(format!("unexpected status {status}")).into(),
            );
        }

        Ok(parse_template_body(&content_type, &body)?)
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(&self, packet: &DeidentifiedPacket) -> Result<TemplateText> {
        let payload = serde_json::to_value(packet)?;
        let skip: Vec<&str> = self.skip_keys.iter().map(String::as_str).collect();
        self.firewall.assert_no_phi(&payload, &skip)?;

        let request_id = Uuid::new_v4();
        tracing::debug!(
            case_id = %packet.case_id,
            request_id = %request_id,
            "Sending de-identified packet"
        );

        let text = self.send(&payload, &request_id).await.inspect_err(|e| {
            tracing::warn!(
                case_id = %packet.case_id,
                request_id = %request_id,
                error = %e,
                "Generation request failed"
            );
        })?;

        tracing::debug!(
            case_id = %packet.case_id,
            request_id = %request_id,
            template_chars = text.chars().count(),
            "Template received"
        );

        Ok(TemplateText::new(text))
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn map_transport_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Timeout(error.to_string())
    } else {
        GenerationError::ConnectionFailed(error.to_string())
    }
}

/// Pull the template out of a response body
///
/// JSON bodies must carry a `template` (or `text`) string; anything else is
/// taken as plain text.
fn parse_template_body(
    content_type: &str,
    body: &str,
) -> std::result::Result<String, GenerationError> {
    let trimmed = body.trim();
    let is_json = content_type.contains("json") || trimmed.starts_with('{');

    let text = if is_json {
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|e| GenerationError::InvalidResponse(format!("malformed JSON body: {e}")))?;
        ["template", "text"]
            .iter()
            .find_map(|field| value.get(*field).and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| {
                GenerationError::InvalidResponse(
                    "JSON body has no 'template' or 'text' string".to_string(),
                )
            })?
    } else {
        body.to_string()
    };

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyTemplate);
    }
    Ok(text)
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    format!("{cut}...")
}
