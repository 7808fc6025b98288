use brightmind::intake::{
    ContactRepository, ContactSubmission, EmailAddress, RegistrationRepository, RepositoryError,
    UserRegistration,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Contact submissions in arrival order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryContactRepository {
    records: Arc<Mutex<Vec<ContactSubmission>>>,
}

impl ContactRepository for InMemoryContactRepository {
    fn insert(&self, submission: ContactSubmission) -> Result<ContactSubmission, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.push(submission.clone());
        Ok(submission)
    }

    fn list(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
    }
}

/// Registrations in arrival order; the uniqueness check and the push share one lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRegistrationRepository {
    records: Arc<Mutex<Vec<UserRegistration>>>,
}

impl RegistrationRepository for InMemoryRegistrationRepository {
    fn insert(&self, registration: UserRegistration) -> Result<UserRegistration, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.email == registration.email)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(registration.clone());
        Ok(registration)
    }

    fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRegistration>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.email == email).cloned())
    }

    fn list(&self) -> Result<Vec<UserRegistration>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
    }
}
