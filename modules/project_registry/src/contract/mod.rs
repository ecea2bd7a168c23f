pub mod client;
pub mod error;
pub mod model;

pub use client::ProjectRegistryApi;
pub use error::RegistryError;
pub use model::*;
