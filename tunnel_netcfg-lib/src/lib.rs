pub mod builder;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod overlay;
pub mod platform;
pub mod query;
pub mod request;
pub mod route;
pub mod runner;
pub mod tools;

#[cfg(test)]
mod mocks;

pub use controller::NetworkController;
pub use error::{Error, Precondition};
pub use platform::PlatformKind;
pub use request::{Operation, Request};
pub use route::{RouteOutcome, RouteSpec};
