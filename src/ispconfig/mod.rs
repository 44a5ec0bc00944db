pub mod client;
pub mod retry;
pub mod soap;
pub mod transport;
pub mod types;

pub use client::IspConfigClient;
pub use retry::{RetryError, RetryPolicy};
pub use soap::SoapTransport;
pub use transport::{Transport, TransportError};
pub use types::{EntityKind, Filter, Record, RemoteCall};
