//! Tubely DB Library
//!
//! Owning-record store for uploaded media. The upload pipeline needs exactly two
//! operations from it, `get` and `update`, expressed by `VideoRepository`.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;

pub use memory::InMemoryVideoRepository;
#[cfg(feature = "postgres")]
pub use postgres::PgVideoRepository;
pub use repository::VideoRepository;
