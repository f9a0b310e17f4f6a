//! The remote object store seam used by the push orchestrator.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::record::Category;

/// What a successful status check learned about the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub version: Option<String>,
    pub hostname: Option<String>,
}

/// Raw answer to a create or update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreResponse {
    pub status: u16,
    pub body: String,
}

impl StoreResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201 | 204)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("category {0} has no remote endpoint")]
    Unsupported(Category),
}

/// A remote CMDB that accepts named objects per category.
pub trait RemoteObjectStore {
    fn test_connection(&mut self) -> Result<ConnectionInfo, StoreError>;

    /// Names of the objects that already exist in `category`.
    fn list_existing(&mut self, category: Category) -> Result<BTreeSet<String>, StoreError>;

    fn create(&mut self, category: Category, payload: &Value)
        -> Result<StoreResponse, StoreError>;

    fn update(
        &mut self,
        category: Category,
        name: &str,
        payload: &Value,
    ) -> Result<StoreResponse, StoreError>;
}

impl<S: RemoteObjectStore + ?Sized> RemoteObjectStore for &mut S {
    fn test_connection(&mut self) -> Result<ConnectionInfo, StoreError> {
        (**self).test_connection()
    }

    fn list_existing(&mut self, category: Category) -> Result<BTreeSet<String>, StoreError> {
        (**self).list_existing(category)
    }

    fn create(
        &mut self,
        category: Category,
        payload: &Value,
    ) -> Result<StoreResponse, StoreError> {
        (**self).create(category, payload)
    }

    fn update(
        &mut self,
        category: Category,
        name: &str,
        payload: &Value,
    ) -> Result<StoreResponse, StoreError> {
        (**self).update(category, name, payload)
    }
}
