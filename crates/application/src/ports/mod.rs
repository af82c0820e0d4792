//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external systems.
//! Each port is a trait that can be implemented by adapters in the
//! infrastructure layer or by the front end.

mod presentation;
mod storage;
mod transport;

pub use presentation::{BusyIndicator, Navigator, NotificationLevel, NotificationSink, SessionView};
pub use storage::{KeyValueStorage, StorageError};
pub use transport::{
    AUTHORIZATION, ApiRequest, ApiResponse, HttpMethod, HttpTransport, TransportError,
};
