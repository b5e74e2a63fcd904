pub mod api;
pub mod id;
pub mod models;

pub use id::{GraphId, InvalidId};
