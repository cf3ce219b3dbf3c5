pub mod annotations;
pub mod backlog;
pub mod db;
pub mod models;
pub mod pages;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
