use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_MESSAGE_LEN: usize = 5_000;

/// Identifier wrapper for stored contact submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub Uuid);

/// Identifier wrapper for registered users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl ContactId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How quickly the sender wants to hear back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Routine,
    Soon,
    Urgent,
    Crisis,
}

impl Urgency {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "routine" | "low" | "normal" => Ok(Self::Routine),
            "soon" | "medium" => Ok(Self::Soon),
            "urgent" | "high" => Ok(Self::Urgent),
            "crisis" | "emergency" => Ok(Self::Crisis),
            _ => Err(ValidationError::InvalidUrgency(raw.trim().to_string())),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Soon => "soon",
            Self::Urgent => "urgent",
            Self::Crisis => "crisis",
        }
    }
}

/// Lower-cased, trimmed e-mail address with a minimal shape check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        let valid = match normalized.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !normalized.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if valid {
            Ok(Self(normalized))
        } else {
            Err(ValidationError::InvalidEmail(raw.trim().to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejections raised before anything is persisted. Messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("'{0}' is not a recognised urgency (routine, soon, urgent, crisis)")]
    InvalidUrgency(String),
    #[error("you must accept the {0} to create an account")]
    ConsentRequired(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

fn required(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Contact form fields as they arrive on the wire.
///
/// Accepts the union of both historical contact schemas: `company` from the
/// marketing page and `urgency` from the support page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Contact fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub company: Option<String>,
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub urgency: Urgency,
    pub message: String,
}

impl ContactRequest {
    pub fn validate(&self) -> Result<ValidContact, ValidationError> {
        Ok(ValidContact {
            name: required("name", &self.name, MAX_NAME_LEN)?,
            company: optional(self.company.as_deref()),
            email: EmailAddress::parse(&self.email)?,
            phone: optional(self.phone.as_deref()),
            urgency: Urgency::parse(self.urgency.as_deref().unwrap_or_default())?,
            message: required("message", &self.message, MAX_MESSAGE_LEN)?,
        })
    }

    /// Multipart text parts in submission order; empty optionals are left out.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("name", self.name.clone())];
        if let Some(company) = &self.company {
            fields.push(("company", company.clone()));
        }
        fields.push(("email", self.email.clone()));
        if let Some(phone) = &self.phone {
            fields.push(("phone", phone.clone()));
        }
        if let Some(urgency) = &self.urgency {
            fields.push(("urgency", urgency.clone()));
        }
        fields.push(("message", self.message.clone()));
        fields
    }

    /// Assign a multipart/form text part by name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "company" => self.company = Some(value),
            "email" => self.email = value,
            "phone" => self.phone = Some(value),
            "urgency" => self.urgency = Some(value),
            "message" => self.message = value,
            _ => {}
        }
    }
}

/// File attached to a contact submission.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type.unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .to_string()
        });
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self::new(file_name, None, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Attachment as kept alongside a submission; listings only expose the metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAttachment {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl From<Attachment> for StoredAttachment {
    fn from(value: Attachment) -> Self {
        Self {
            size_bytes: value.bytes.len(),
            file_name: value.file_name,
            content_type: value.content_type,
            bytes: value.bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: ContactId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub email: EmailAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub urgency: Urgency,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<StoredAttachment>,
    pub submitted_at: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn receipt(&self) -> ContactReceipt {
        ContactReceipt {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            urgency: self.urgency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReceipt {
    pub id: ContactId,
    pub name: String,
    pub email: EmailAddress,
    pub urgency: Urgency,
}

/// Accepts `"25"` or `25` for free-text fields that forms sometimes send as numbers.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}

/// Registration body as it arrives on the wire.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub age: String,
    #[serde(default)]
    pub agree_to_terms: bool,
    #[serde(default)]
    pub agree_to_privacy: bool,
    #[serde(default)]
    pub subscribe_newsletter: bool,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("age", &self.age)
            .field("agree_to_terms", &self.agree_to_terms)
            .field("agree_to_privacy", &self.agree_to_privacy)
            .field("subscribe_newsletter", &self.subscribe_newsletter)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: EmailAddress,
    pub age: String,
    pub subscribe_newsletter: bool,
}

impl RegistrationRequest {
    pub fn validate(&self) -> Result<ValidRegistration, ValidationError> {
        let first_name = required("firstName", &self.first_name, MAX_NAME_LEN)?;
        let last_name = required("lastName", &self.last_name, MAX_NAME_LEN)?;
        let email = EmailAddress::parse(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        let age = required("age", &self.age, 32)?;
        if !self.agree_to_terms {
            return Err(ValidationError::ConsentRequired("terms of service"));
        }
        if !self.agree_to_privacy {
            return Err(ValidationError::ConsentRequired("privacy policy"));
        }
        Ok(ValidRegistration {
            first_name,
            last_name,
            email,
            age,
            subscribe_newsletter: self.subscribe_newsletter,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistration {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: EmailAddress,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: String,
    pub agree_to_terms: bool,
    pub agree_to_privacy: bool,
    pub subscribe_newsletter: bool,
    pub registered_at: DateTime<Utc>,
}

impl UserRegistration {
    pub fn receipt(&self) -> RegistrationReceipt {
        RegistrationReceipt {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn password_matches(&self, candidate: &str) -> bool {
        use argon2::password_hash::{PasswordHash, PasswordVerifier};
        use argon2::Argon2;

        PasswordHash::new(&self.password_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: EmailAddress,
}

/// Response body shared by every intake endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
