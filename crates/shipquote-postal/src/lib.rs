pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::PostalClient;
pub use error::PostalError;
pub use types::AddressResponse;
