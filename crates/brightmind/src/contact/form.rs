use super::client::{ContactClient, ContactError, ContactOutcome, ContactTransport};
use crate::intake::{Attachment, ContactRequest};

/// Contact form state between edits and submissions.
///
/// Only a delivered submission clears the form; rejections and connection
/// failures leave every field as the user typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub fields: ContactRequest,
    pub attachment: Option<Attachment>,
}

impl ContactForm {
    pub fn new(fields: ContactRequest, attachment: Option<Attachment>) -> Self {
        Self { fields, attachment }
    }

    /// Holding `&mut self` across the request keeps a second submit out while one is pending.
    pub async fn submit<T>(
        &mut self,
        client: &ContactClient<T>,
    ) -> Result<ContactOutcome, ContactError>
    where
        T: ContactTransport,
    {
        let outcome = client
            .submit(&self.fields, self.attachment.as_ref())
            .await?;
        if outcome.is_delivered() {
            self.clear();
        }
        Ok(outcome)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::client::scripted::ScriptedTransport;

    fn filled() -> ContactForm {
        ContactForm::new(
            ContactRequest {
                name: "Avery".to_string(),
                company: None,
                email: "avery@example.net".to_string(),
                phone: Some("555-0199".to_string()),
                urgency: Some("urgent".to_string()),
                message: "Need an appointment this week.".to_string(),
            },
            Some(Attachment::new("referral.txt", None, b"dr. note".to_vec())),
        )
    }

    #[tokio::test]
    async fn delivery_resets_the_form() {
        let client = ContactClient::new(ScriptedTransport::replying(
            201,
            r#"{"success":true,"message":"sent"}"#,
        ));
        let mut form = filled();

        let outcome = form.submit(&client).await.expect("delivered");

        assert!(outcome.is_delivered());
        assert!(form.is_blank());
    }

    #[tokio::test]
    async fn connection_failure_leaves_form_untouched() {
        let client = ContactClient::new(ScriptedTransport::failing("dns error"));
        let mut form = filled();
        let before = form.clone();

        let result = form.submit(&client).await;

        assert!(matches!(result, Err(ContactError::ConnectionFailure { .. })));
        assert_eq!(form, before);
    }

    #[tokio::test]
    async fn rejection_leaves_form_untouched() {
        let client = ContactClient::new(ScriptedTransport::replying(
            400,
            r#"{"success":false,"message":"message is required"}"#,
        ));
        let mut form = filled();
        let before = form.clone();

        let outcome = form.submit(&client).await.expect("answered");

        assert_eq!(outcome.message(), "message is required");
        assert_eq!(form, before);
    }
}
