//! Access to the Jolpica (Ergast-compatible) F1 API
//!
//! Layers, bottom up: a [`Transport`] that performs GETs, the [`ApiClient`]
//! with retry and degradation rules, and the [`CollectionLoader`] that pages
//! through season collections and memoizes the merged result.

pub mod client;
pub mod loader;
pub mod transport;
pub mod urls;

pub use client::{sentinel_payload, ApiClient, ApiError};
pub use loader::{Collection, CollectionLoader, LoadError, MergeStrategy, Resource};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError, RSS_ACCEPT};
pub use urls::{with_query, Endpoints};
