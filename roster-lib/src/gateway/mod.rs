//! Remote record collections.
//!
//! A [`RecordGateway`] is the only way the table reaches its data. Transport,
//! authentication and endpoint addressing are the implementation's concern.

mod http;
mod memory;

pub use http::*;
pub use memory::*;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::model::ListPage;
use crate::model::Record;
use crate::model::RecordId;

/// List, create, update and delete against one remote collection.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Fetches the first page of the collection with its total size.
    async fn list(&self) -> Result<ListPage, GatewayError>;

    /// Persists a new record and returns it with its assigned id.
    async fn create(&self, record: &Record) -> Result<Record, GatewayError>;

    /// Saves changes to an existing record and returns the stored version.
    async fn update(&self, record: &Record) -> Result<Record, GatewayError>;

    /// Removes the record with the given id.
    async fn delete(&self, id: &RecordId) -> Result<(), GatewayError>;
}
