//! REST API endpoint modules (§4.8). Each sub-module owns one area of the
//! surface; handlers and their request/response DTOs are re-exported flat
//! here so `router.rs` can register them without reaching into submodules.

pub mod chat;
pub mod commands;
pub mod diagnose;
pub(crate) mod doc;
pub mod dto;
pub(crate) mod health;
pub mod logigramme;
pub mod sensor;

pub use chat::chat;
pub use commands::{emergency_stop, inject_fault};
pub use diagnose::diagnose;
pub use health::health;
pub use logigramme::logigramme;
pub use sensor::{fault_context, fault_types, sensor_data, sensor_history};
