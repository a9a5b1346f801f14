//! Endpoint groups. Each module adds methods to [`ApiClient`](crate::ApiClient).

pub mod branches;
pub mod employees;
pub mod products;
pub mod profile;
pub mod reports;
pub mod restored;
pub mod sold;
pub mod trash;
