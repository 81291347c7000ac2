//! # xero-adapter
//!
//! An adapter around the Xero accounting API that keeps one OAuth2 token in a
//! credential store and refreshes it without user interaction.
//!
//! ## Errors and tracing
//!
//! Errors carry async span traces captured where they were created. Install
//! `tracing_error::ErrorLayer` in the subscriber to have them filled in:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .init();
//! ```
//!
//! Vendor rejections (HTTP 400) and missing objects (HTTP 404) are logged and come
//! back as empty results from the resource APIs. Everything else is an [`Error`].

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod adapter;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod oauth;
pub mod report;
pub mod resource;
pub mod scope;
pub mod token;
pub mod utils;

pub use adapter::XeroAdapter;
pub use client::Client;
pub use config::Config;
pub use endpoints::XeroEndpoint;
pub use entities::*;
pub use error::{Error, Result};
pub use oauth::KeyPair;
pub use report::{Report, ReportRow};
pub use resource::{DeleteStrategy, Filter, Outcome, Resource, ResourceApi, Selector};
pub use scope::{Permission, Scope, ScopeType};
pub use token::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, Token, TokenManager,
};

// Re-export SpanTrace for users who want to access it
pub use tracing_error::SpanTrace;
