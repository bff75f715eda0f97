//! Custom Axum extractors.

pub mod owner;
pub mod pagination;

pub use owner::Owner;
pub use pagination::PaginationParams;
