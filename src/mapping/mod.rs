//! Mapping from logical key intents to injected key events
//!
//! - [`key_map`] - physical button → logical key → (code, label) tables
//! - [`focus`] - drops intents while the host window is unfocused
//! - [`dispatcher`] - special-cases the OSK toggle and Shift+Tab, retries failed injections
//! - [`injector`] - the injection seam and its egui channel implementation
//! - [`error`] - injection errors

pub mod dispatcher;
pub mod error;
pub mod focus;
pub mod injector;
pub mod key_map;

pub use dispatcher::Dispatcher;
pub use error::InjectError;
pub use key_map::{KeyCodeMap, LogicalKey};
