//! # SharePoint Pages
//!
//! Client for SharePoint "modern" client side pages over the REST API:
//!
//! - **Canvas model** — Sections → columns → controls with dense 1-based
//!   position bookkeeping, round-tripped through `CanvasContent1`
//! - **Page lifecycle** — Create, load, checkout, save, publish,
//!   discard, copy, promote to news
//! - **Title region** — Layout part handling: header layout, topic
//!   header, banner image with server-side preview-URL resolution
//! - **Batching** — `multipart/mixed` `$batch` with per-write changesets
//! - **Comments** — Item-backed comments, replies and likes via the
//!   [`comments::Commentable`] capability
//! - **Transport** — `reqwest`-backed executor with Bearer auth, OData
//!   headers and retry with exponential back-off for throttling

pub mod error;
pub mod types;
pub mod client;
pub mod odata;
pub mod batch;
pub mod canvas;
pub mod pages;
pub mod comments;

pub use client::{HttpExecutor, SharePointRestClient};
pub use error::{SharePointError, SharePointErrorCode, SharePointResult};
pub use pages::{ClientsidePage, ClientsidePages};
pub use types::SharePointConfig;
