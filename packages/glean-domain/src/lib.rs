pub mod annotation;
pub mod bounds;
pub mod cluster;
pub mod filter;
pub mod page;
pub mod params;
pub mod sync;
pub mod terms;
pub mod time_serde;
