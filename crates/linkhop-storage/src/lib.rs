pub mod memory;
pub mod postgres;

pub use linkhop_core::repository::{ReadRepository, Repository, VisitRepository};
pub use linkhop_core::StorageError;
pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;
