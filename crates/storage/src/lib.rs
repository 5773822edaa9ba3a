#![forbid(unsafe_code)]

pub mod availability;
pub mod dispatch;
pub mod mysql;
pub mod probe;
pub mod repository;
pub mod session_store;

pub use availability::{Availability, StoreAvailability, StoreKind};
pub use repository::{Storage, StorageError};
