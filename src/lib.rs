//! Sera is a small chat front-end for the Gemini API, split into a relay
//! service and a terminal chat client.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns session state, the message transcript, and configuration.
//! - [`relay`] implements the HTTP service that forwards a chat message to
//!   the Gemini API and returns the reply.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop, including the per-message text-reveal animation.
//! - [`api`] defines the wire payloads shared by the relay service and the
//!   client that calls it.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`): the default
//! invocation runs [`ui::chat_loop`], and `sera serve` runs [`relay::serve`].

pub mod api;
pub mod core;
pub mod relay;
pub mod ui;
pub mod utils;
