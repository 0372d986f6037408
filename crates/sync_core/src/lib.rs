//! Keeps a set of parameter widgets in step with a realtime key/value feed.
//!
//! A [`SyncEngine`] holds an ordered roster of controls and an active-control
//! cursor. Feed events on the navigation channels move the cursor and its
//! highlight; keyed value events carry a normalized `[0, 1]` scalar that is
//! mapped onto the target control's native value. [`SyncDriver`] runs an
//! engine against any [`feed_integration::RealtimeFeed`].

pub mod classifier;
pub mod config;
pub mod cursor;
pub mod driver;
pub mod engine;
pub mod highlight;
pub mod mapper;
pub mod memory;
pub mod widget;

pub use classifier::classify;
pub use config::{load_overrides, load_panel_spec, merge_defaults, ParamOverrides, SyncParams};
pub use cursor::{Direction, RosterEntry, SelectionCursor};
pub use driver::SyncDriver;
pub use engine::{Subscription, SyncEngine};
pub use mapper::{apply, map_value, ControlWrite};
pub use memory::{MemoryControl, MemoryPanel};
pub use widget::{ControlFolder, ControlHandle, ControlPanel, ControlWidget};
