//! Infrastructure layer: storage, atomic commit, read model, application
//! operations and configuration.

pub mod application;
pub mod committer;
pub mod config;
pub mod read_model;
pub mod repository;
pub mod store;

pub use application::{AppError, ProductCommands, ProductQueries};
pub use committer::{CommitPlan, Committer};
pub use config::{connect_pool, CatalogConfig, ConfigError};
pub use read_model::{ListFilter, ProductReadModel, ProductView};
pub use repository::{OutboxEntry, OutboxRepository, ProductRepository, RepositoryError};
pub use store::{InMemoryStore, PostgresStore, Store, StoreError, WriteOp};
