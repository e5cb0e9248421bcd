pub mod dispatch;
pub mod error;
pub mod models;
pub mod registry;
pub mod transport;
pub use dispatch::*;
pub use error::RelayError;
pub use models::*;
pub use registry::SubscriptionRegistry;
pub use transport::MessagingTransport;
