use std::future::Future;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::config::ContactConfig;
use crate::intake::{Attachment, ContactRequest, Envelope, ValidationError};

/// Body of one contact POST: text parts in order plus the optional file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPayload {
    pub fields: Vec<(&'static str, String)>,
    pub attachment: Option<Attachment>,
}

/// Raw reply from the contact endpoint, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Network seam for the contact client.
pub trait ContactTransport: Send + Sync {
    fn endpoint(&self) -> &str;

    fn post(
        &self,
        payload: ContactPayload,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// `reqwest` transport posting `multipart/form-data` with the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpContactTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpContactTransport {
    pub fn new(config: &ContactConfig) -> Result<Self, ContactError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ContactError::ClientSetup(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl ContactTransport for HttpContactTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, payload: ContactPayload) -> Result<TransportResponse, TransportError> {
        let mut form = Form::new();
        for (name, value) in payload.fields {
            form = form.text(name, value);
        }
        if let Some(file) = payload.attachment {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)
                .map_err(|err| TransportError(err.to_string()))?;
            form = form.part("attachment", part);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError(err.to_string()))?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// `data` of a successful contact reply. Ids may come back as strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeliveryReceipt {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub urgency: Option<String>,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => id,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    Delivered {
        message: String,
        receipt: Option<DeliveryReceipt>,
    },
    /// The API answered `success: false`; `message` is passed through verbatim.
    Rejected { message: String },
}

impl ContactOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ContactOutcome::Delivered { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ContactOutcome::Delivered { message, .. } | ContactOutcome::Rejected { message } => {
                message
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Unable to send message. Please check if the server is running on {endpoint}")]
    ConnectionFailure { endpoint: String, detail: String },
    #[error("unable to build http client: {0}")]
    ClientSetup(String),
}

pub struct ContactClient<T> {
    transport: T,
}

impl<T> ContactClient<T>
where
    T: ContactTransport,
{
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Validate locally, then make a single POST. Never retries.
    pub async fn submit(
        &self,
        request: &ContactRequest,
        attachment: Option<&Attachment>,
    ) -> Result<ContactOutcome, ContactError> {
        request.validate()?;

        let payload = ContactPayload {
            fields: request.form_fields(),
            attachment: attachment.cloned(),
        };
        let connection_failure = |detail: String| {
            warn!(endpoint = self.endpoint(), %detail, "contact submission failed to connect");
            ContactError::ConnectionFailure {
                endpoint: self.endpoint().to_string(),
                detail,
            }
        };

        let response = self
            .transport
            .post(payload)
            .await
            .map_err(|err| connection_failure(err.to_string()))?;
        // only `success` and `message` decide the outcome; `data` is best effort
        let envelope: Envelope<serde_json::Value> = serde_json::from_slice(&response.body)
            .map_err(|err| connection_failure(format!("unreadable response: {err}")))?;

        if envelope.success {
            let receipt = envelope
                .data
                .and_then(|data| serde_json::from_value::<DeliveryReceipt>(data).ok());
            info!(
                status = response.status,
                has_receipt = receipt.is_some(),
                "contact form delivered"
            );
            Ok(ContactOutcome::Delivered {
                message: envelope.message,
                receipt,
            })
        } else {
            warn!(status = response.status, message = %envelope.message, "contact form rejected");
            Ok(ContactOutcome::Rejected {
                message: envelope.message,
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replays one canned reply and records what was posted.
    pub(crate) struct ScriptedTransport {
        reply: Result<(u16, &'static str), &'static str>,
        calls: AtomicUsize,
        last: Mutex<Option<ContactPayload>>,
    }

    impl ScriptedTransport {
        pub(crate) fn replying(status: u16, body: &'static str) -> Self {
            Self::new(Ok((status, body)))
        }

        pub(crate) fn failing(detail: &'static str) -> Self {
            Self::new(Err(detail))
        }

        fn new(reply: Result<(u16, &'static str), &'static str>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn last_payload(&self) -> Option<ContactPayload> {
            self.last.lock().expect("payload mutex poisoned").clone()
        }
    }

    impl ContactTransport for ScriptedTransport {
        fn endpoint(&self) -> &str {
            "http://127.0.0.1:3020/api/contact"
        }

        async fn post(&self, payload: ContactPayload) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().expect("payload mutex poisoned") = Some(payload);
            match self.reply {
                Ok((status, body)) => Ok(TransportResponse {
                    status,
                    body: body.as_bytes().to_vec(),
                }),
                Err(detail) => Err(TransportError(detail.to_string())),
            }
        }
    }
}
