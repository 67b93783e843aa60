//! # flex-db
//!
//! Storage layer for Flex API.
//!
//! The services only talk to the two directory ports defined in [`directory`]:
//!
//! - [`UserDirectory`]: account records and their applied-class sets
//! - [`ClassDirectory`]: class listings and their applicant sets
//!
//! Two implementations are provided: PostgreSQL repositories built on SQLx and
//! in-memory directories used by tests and `STORAGE=memory`.
//!
//! ## Example
//!
//! ```ignore
//! use flex_db::{ClassRepository, Database, PoolConfig, UserRepository};
//!
//! let db = Database::connect(&PoolConfig::with_url("postgres://localhost/flex-api")).await?;
//! db.migrate().await?;
//!
//! let users = UserRepository::new(db.pool().clone());
//! let classes = ClassRepository::new(db.pool().clone());
//! ```

pub mod classes;
pub mod directory;
pub mod memory;
pub mod pool;
pub mod repository;
pub mod users;

// Re-exports
pub use classes::{ClassRepository, ClassRow};
pub use directory::{ClassDirectory, ClassFilter, ClassQuery, SetAdd, SortOrder, UserDirectory};
pub use memory::{MemoryClassDirectory, MemoryUserDirectory};
pub use pool::{Database, PoolConfig};
pub use repository::{RepositoryError, RepositoryResult};
pub use users::{UserRepository, UserRow};

#[cfg(feature = "mocks")]
pub use directory::{MockClassDirectory, MockUserDirectory};
