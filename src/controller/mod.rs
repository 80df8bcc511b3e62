//! Controller subsystem: gamepad snapshots to key intents
//!
//! 1. [`frame_source`] - polls gilrs once per frame into [`snapshot::DeviceSnapshot`]s
//! 2. [`selector`] - picks the canonical device or falls back to all of them
//! 3. [`repeat_engine`] - edge detection, axis hysteresis and typematic repeat
//! 4. [`bridge`] - feeds intents through the focus gate into the dispatcher
//! 5. [`controller_handle`] - the tokio task and its lifecycle
//!
//! # Architecture
//!
//! ```text
//! gilrs ──► FramePoller ──► Selector ──► RepeatEngine ──► FocusGate ──► Dispatcher
//!           (snapshots)                  (KeyIntent)                    (inject / toggle OSK)
//! ```

pub mod bridge;
pub mod controller_handle;
pub mod frame_source;
pub mod repeat_engine;
pub mod selector;
pub mod snapshot;
