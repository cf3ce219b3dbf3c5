pub mod html;
pub mod page;

mod error;

pub use error::{Error, Result};
