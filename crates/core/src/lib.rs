//! Phone Responder Core
//!
//! Domain logic for the telephony webhook: pulling the caller's utterance out
//! of a platform payload, asking a text-generation backend for a reply, and
//! wrapping that reply in the envelope the calling platform expects. Nothing
//! in this crate knows about HTTP; the `responder-api` service is a thin
//! adapter around [`handler::CallHandler`].

pub mod fulfillment;
pub mod handler;
pub mod llm_client;
pub mod platform;
pub mod query;
