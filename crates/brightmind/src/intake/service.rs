use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    Attachment, ContactId, ContactRequest, ContactSubmission, RegistrationRequest, UserId,
    UserRegistration, ValidationError,
};
use super::repository::{ContactRepository, RegistrationRepository, RepositoryError};
use crate::config::IntakeConfig;

/// Validates and stores contact submissions and registrations.
///
/// Built once at startup with its repositories injected; handlers share it through an `Arc`.
pub struct IntakeService<C, U> {
    contacts: Arc<C>,
    registrations: Arc<U>,
    limits: IntakeConfig,
}

impl<C, U> IntakeService<C, U>
where
    C: ContactRepository + 'static,
    U: RegistrationRepository + 'static,
{
    pub fn new(contacts: Arc<C>, registrations: Arc<U>, limits: IntakeConfig) -> Self {
        Self {
            contacts,
            registrations,
            limits,
        }
    }

    pub fn limits(&self) -> &IntakeConfig {
        &self.limits
    }

    /// Validate and persist one contact form submission.
    pub fn submit_contact(
        &self,
        request: ContactRequest,
        attachment: Option<Attachment>,
    ) -> Result<ContactSubmission, IntakeError> {
        let contact = request.validate()?;
        if let Some(file) = &attachment {
            if file.size() > self.limits.max_attachment_bytes {
                return Err(IntakeError::AttachmentTooLarge {
                    limit: self.limits.max_attachment_bytes,
                });
            }
        }

        let submission = ContactSubmission {
            id: ContactId::generate(),
            name: contact.name,
            company: contact.company,
            email: contact.email,
            phone: contact.phone,
            urgency: contact.urgency,
            message: contact.message,
            attachment: attachment.map(Into::into),
            submitted_at: Utc::now(),
        };

        let stored = self.contacts.insert(submission)?;
        info!(
            id = %stored.id,
            email = %stored.email,
            urgency = stored.urgency.as_str(),
            "contact form submitted"
        );
        Ok(stored)
    }

    /// Validate, hash the password, and persist a new account.
    ///
    /// Password hashing is CPU bound; async callers should run this on a blocking thread.
    pub fn register(&self, request: RegistrationRequest) -> Result<UserRegistration, IntakeError> {
        let registration = request.validate()?;

        if self
            .registrations
            .find_by_email(&registration.email)?
            .is_some()
        {
            warn!(email = %registration.email, "duplicate registration rejected");
            return Err(IntakeError::DuplicateEmail);
        }

        let password_hash = hash_password(&request.password)?;
        let record = UserRegistration {
            id: UserId::generate(),
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            password_hash,
            age: registration.age,
            agree_to_terms: request.agree_to_terms,
            agree_to_privacy: request.agree_to_privacy,
            subscribe_newsletter: registration.subscribe_newsletter,
            registered_at: Utc::now(),
        };

        // the repository re-checks uniqueness atomically; a racing duplicate lands here
        let stored = self
            .registrations
            .insert(record)
            .map_err(|err| match err {
                RepositoryError::Conflict => IntakeError::DuplicateEmail,
                other => IntakeError::Repository(other),
            })?;
        info!(id = %stored.id, email = %stored.email, "new user registered");
        Ok(stored)
    }

    pub fn contacts(&self) -> Result<Vec<ContactSubmission>, IntakeError> {
        Ok(self.contacts.list()?)
    }

    pub fn registrations(&self) -> Result<Vec<UserRegistration>, IntakeError> {
        Ok(self.registrations.list()?)
    }
}

fn hash_password(password: &str) -> Result<String, IntakeError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| IntakeError::PasswordHash(err.to_string()))
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("This email is already registered. Please use a different email.")]
    DuplicateEmail,
    #[error("attachment exceeds the {limit} byte limit")]
    AttachmentTooLarge { limit: usize },
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("unable to hash password: {0}")]
    PasswordHash(String),
}
