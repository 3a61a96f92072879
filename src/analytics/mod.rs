pub mod error;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod reports;
pub mod repository;
pub mod scoring;
pub mod service;

pub use error::*;
pub use models::*;
pub use pricing::*;
pub use repository::*;
pub use scoring::*;
pub use service::*;
