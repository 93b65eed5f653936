// zabtree-api: Async Rust client for the Zabbix JSON-RPC API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
mod services;
mod session;
mod triggers;
pub mod transport;

pub use auth::Credentials;
pub use client::ZabbixClient;
pub use error::Error;
pub use models::{HostGroup, ServiceCreate, ServiceRecord, Trigger, TriggerHost, TriggerQuery};
pub use transport::{TlsMode, TransportConfig};
