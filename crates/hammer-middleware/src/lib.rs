//! `hammer-middleware` – notification plumbing
//!
//! Moves notifications from the behavior core to whoever is listening,
//! without caring what they mean.
//!
//! # Modules
//!
//! - [`sink`] – the [`NotificationSink`] trait the core emits through, plus an
//!   in-memory [`RecordingSink`].
//! - [`bus`] – [`EventBus`], a Tokio broadcast bus that wraps notifications in
//!   timestamped [`Event`][hammer_types::Event] envelopes.

pub mod bus;
pub mod sink;

pub use bus::EventBus;
pub use sink::{NotificationSink, RecordingSink};
