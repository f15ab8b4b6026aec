//! Domain layer for shoplist.
//!
//! Core types shared by the engine, the storage layer, and the sync worker,
//! independent of any host UI or persistence backend.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`item`]: Item record, importance levels, entry lifecycle
//! - [`change`]: Validated change-feed events
//!
//! # Examples
//!
//! ```
//! use shoplist::domain::{Importance, ItemId, ItemRecord};
//!
//! let item = ItemRecord::new(ItemId(1), "eggs", Importance::Important);
//! assert!(!item.is_placeholder());
//! ```

pub mod change;
pub mod error;
pub mod item;

pub use change::RemoteChange;
pub use error::{Result, ShoplistError};
pub use item::{EntryState, EntryTrigger, Importance, ItemId, ItemRecord, Transition};
