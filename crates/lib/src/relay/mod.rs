//! Relay: inbound webhook HTTP server.
//!
//! `POST /webhook/{access_token}` with `{"text": "..."}` is reshaped into a DingTalk
//! text message and forwarded to the robot identified by the token.

mod protocol;
mod server;

pub use protocol::Alert;
pub use server::{router, routing_credential, run_server, serve_on, RelayState, WEBHOOK_PREFIX};
