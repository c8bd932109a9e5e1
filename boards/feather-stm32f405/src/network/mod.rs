#![deny(warnings)]
//! Network module
//!
//! - **`config`**: Configuration structs with `Default` implementations
//! - **`error`**: Simple error enum for network operations
//! - **`manager`**: bounded wait for the DHCP lease
//! - **`sntp`**: SNTP client that feeds the clock service
//!
//! The W5500 driver (`embassy-net-wiznet`) provides the device and runner;
//! `embassy-net` handles UDP/DNS/DHCP and the SNTP client uses its sockets
//! directly.

pub mod config;
pub mod error;
pub mod manager;
pub mod sntp;

// Re-export commonly used types
pub use config::NetworkConfig;
pub use sntp::SntpClient;
