pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::ApplicationRecord;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Mutation applied inside `ApplicationStore::update`. Returning an error
/// aborts the update and leaves the stored record untouched.
pub type Mutator<'a> = &'a (dyn Fn(&mut ApplicationRecord) -> Result<()> + Send + Sync);

/// Keyed persistence for application records. The application service is
/// the only writer.
///
/// `update` is an atomic read-modify-write: two concurrent updates to the
/// same id must not interleave, so a check inside the mutator is evaluated
/// against the value that is actually overwritten.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Fails with `Conflict` if the id already exists. Ids are generated
    /// with UUIDv4, so this is a defensive check, not an expected path.
    async fn create(&self, record: ApplicationRecord) -> Result<ApplicationRecord>;

    async fn get(&self, id: Uuid) -> Result<ApplicationRecord>;

    async fn update(&self, id: Uuid, mutate: Mutator<'_>) -> Result<ApplicationRecord>;
}
