//! Contact form and registration intake API.
//!
//! Request bodies are parsed into explicit schema types and validated before
//! the injected repositories see them. Every response uses the
//! `{success, message, data?}` envelope.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Attachment, ContactId, ContactReceipt, ContactRequest, ContactSubmission, EmailAddress,
    Envelope, RegistrationReceipt, RegistrationRequest, StoredAttachment, Urgency, UserId,
    UserRegistration, ValidationError,
};
pub use repository::{ContactRepository, RegistrationRepository, RepositoryError};
pub use router::intake_router;
pub use service::{IntakeError, IntakeService};
