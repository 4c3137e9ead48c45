//! Local intent endpoint
//!
//! The request-handling front end (HTTP, OAuth and the platform envelope)
//! forwards decoded intents over a local TCP socket. Each frame carries one
//! JSON `IntentRequest`; each reply is one JSON `IntentResponse`.

mod listener;
mod session;

pub use listener::IntentListener;
pub use session::IntentSession;
