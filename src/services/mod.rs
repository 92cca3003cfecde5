//! Service lifecycle contract and the sequencing manager.

mod manager;
mod service;

pub use manager::Manager;
pub use service::Service;
