//! Client side of the contact form.
//!
//! [`ContactClient`] makes exactly one multipart POST per submission and keeps
//! transport failures apart from rejections reported by the API.

mod client;
mod form;

pub use client::{
    ContactClient, ContactError, ContactOutcome, ContactPayload, ContactTransport,
    DeliveryReceipt, HttpContactTransport, TransportError, TransportResponse,
};
pub use form::ContactForm;
