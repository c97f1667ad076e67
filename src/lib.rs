//! Parley is a line-oriented chat client for OpenAI-compatible chat
//! completion APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns configuration, conversation history, request building and
//!   the streaming consumer that turns a server-sent-event body into
//!   cancellable reply events.
//! - [`commands`] implements slash-command parsing and execution used by the
//!   chat loop.
//! - [`api`] defines the chat payloads exchanged with the provider and the
//!   built-in model catalog.
//! - [`utils`] holds URL handling and the transcript logger.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod utils;
