use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::IntakeConfig;
use crate::intake::domain::{
    ContactRequest, ContactSubmission, EmailAddress, RegistrationRequest, UserRegistration,
};
use crate::intake::repository::{ContactRepository, RegistrationRepository, RepositoryError};
use crate::intake::IntakeService;

pub(super) const BOUNDARY: &str = "brightmind-test-boundary";

pub(super) fn limits() -> IntakeConfig {
    IntakeConfig {
        max_attachment_bytes: 32,
    }
}

pub(super) fn contact_request() -> ContactRequest {
    ContactRequest {
        name: "Riley Morgan".to_string(),
        company: Some("Northwind".to_string()),
        email: "riley@example.org".to_string(),
        phone: Some("555-0100".to_string()),
        urgency: Some("soon".to_string()),
        message: "Looking for a therapist who works evenings.".to_string(),
    }
}

pub(super) fn registration_request() -> RegistrationRequest {
    RegistrationRequest {
        first_name: "Jordan".to_string(),
        last_name: "Ellis".to_string(),
        email: "Jordan.Ellis@example.org".to_string(),
        password: "a long enough passphrase".to_string(),
        age: "25-34".to_string(),
        agree_to_terms: true,
        agree_to_privacy: true,
        subscribe_newsletter: true,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryContacts {
    records: Arc<Mutex<Vec<ContactSubmission>>>,
}

impl ContactRepository for MemoryContacts {
    fn insert(&self, submission: ContactSubmission) -> Result<ContactSubmission, RepositoryError> {
        self.records
            .lock()
            .expect("contacts mutex poisoned")
            .push(submission.clone());
        Ok(submission)
    }

    fn list(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
        Ok(self.records.lock().expect("contacts mutex poisoned").clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRegistrations {
    records: Arc<Mutex<HashMap<EmailAddress, UserRegistration>>>,
}

impl RegistrationRepository for MemoryRegistrations {
    fn insert(
        &self,
        registration: UserRegistration,
    ) -> Result<UserRegistration, RepositoryError> {
        let mut guard = self.records.lock().expect("registrations mutex poisoned");
        if guard.contains_key(&registration.email) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(registration.email.clone(), registration.clone());
        Ok(registration)
    }

    fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRegistration>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("registrations mutex poisoned")
            .get(email)
            .cloned())
    }

    fn list(&self) -> Result<Vec<UserRegistration>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("registrations mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

/// Lookup never sees the other writer, insert loses the race.
pub(super) struct RacingRegistrations;

impl RegistrationRepository for RacingRegistrations {
    fn insert(&self, _: UserRegistration) -> Result<UserRegistration, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn find_by_email(&self, _: &EmailAddress) -> Result<Option<UserRegistration>, RepositoryError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<UserRegistration>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableContacts;

impl ContactRepository for UnavailableContacts {
    fn insert(&self, _: ContactSubmission) -> Result<ContactSubmission, RepositoryError> {
        Err(RepositoryError::Unavailable("document store offline".to_string()))
    }

    fn list(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
        Err(RepositoryError::Unavailable("document store offline".to_string()))
    }
}

pub(super) type MemoryService = IntakeService<MemoryContacts, MemoryRegistrations>;

pub(super) fn build_service() -> (Arc<MemoryService>, MemoryContacts, MemoryRegistrations) {
    let contacts = MemoryContacts::default();
    let registrations = MemoryRegistrations::default();
    let service = Arc::new(IntakeService::new(
        Arc::new(contacts.clone()),
        Arc::new(registrations.clone()),
        limits(),
    ));
    (service, contacts, registrations)
}

pub(super) fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"attachment\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
