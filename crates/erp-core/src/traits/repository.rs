//! Generic repository trait for database access.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::UserId;
use crate::types::pagination::Page;
use crate::types::query::ListQuery;

/// The CRUD template every entity repository follows.
///
/// Lookups fail with `ErrorKind::NotFound` instead of returning `None`;
/// updates and deletes of a missing id fail the same way and change
/// nothing. Entity-specific query methods are defined on the concrete
/// repository structs.
#[async_trait]
pub trait Repository<Entity, Id>: Send + Sync + 'static
where
    Entity: Send + Sync + 'static,
    Id: Send + Sync + 'static,
{
    /// Payload accepted by [`Repository::create`].
    type Create: Send + Sync;
    /// Payload accepted by [`Repository::update_by_id`].
    type Update: Send + Sync;

    /// Insert a new row in its own transaction and return it.
    async fn create(&self, data: &Self::Create, actor: Option<UserId>) -> AppResult<Entity>;

    /// Find a row by its primary key.
    async fn find_by_id(&self, id: Id) -> AppResult<Entity>;

    /// Find a row by its unique name.
    async fn find_by_name(&self, name: &str) -> AppResult<Entity>;

    /// Filtered, sorted, paginated listing.
    async fn list(&self, query: &ListQuery) -> AppResult<Page<Entity>>;

    /// Update an existing row and return the new version.
    async fn update_by_id(
        &self,
        id: Id,
        data: &Self::Update,
        actor: Option<UserId>,
    ) -> AppResult<Entity>;

    /// Delete a row by its primary key.
    async fn delete_by_id(&self, id: Id) -> AppResult<()>;

    /// Count total rows.
    async fn count(&self) -> AppResult<u64>;
}
