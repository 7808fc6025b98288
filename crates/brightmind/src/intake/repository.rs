use super::domain::{ContactSubmission, EmailAddress, UserRegistration};

/// Storage for contact form submissions. Records are append-only.
pub trait ContactRepository: Send + Sync {
    fn insert(&self, submission: ContactSubmission) -> Result<ContactSubmission, RepositoryError>;
    fn list(&self) -> Result<Vec<ContactSubmission>, RepositoryError>;
}

/// Storage for user registrations.
///
/// `insert` must refuse a second record with the same e-mail address with
/// [`RepositoryError::Conflict`] as part of the same write, not as a separate lookup.
pub trait RegistrationRepository: Send + Sync {
    fn insert(&self, registration: UserRegistration)
        -> Result<UserRegistration, RepositoryError>;
    fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRegistration>, RepositoryError>;
    fn list(&self) -> Result<Vec<UserRegistration>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
