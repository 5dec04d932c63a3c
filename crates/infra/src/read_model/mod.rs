//! Query side: display-ready product views straight from stored rows.

pub mod products;

pub use products::{project, ListFilter, ProductReadModel, ProductView, DEFAULT_PAGE_SIZE};
