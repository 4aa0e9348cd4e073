//! # player-ingest
//!
//! One-shot batch loader that turns two CSV files (players and their
//! market valuations) into one MongoDB document per player, with the
//! player's valuation history nested under a `valuations` array.
//!
//! ## Architecture
//!
//! ```text
//! players.csv ─┐
//!              ├── Loader (loader)          rows → Table
//! valuations ──┘
//!     │
//!     ├── Grouper/Merger (service::merge)   group by key, nest under player
//!     │
//!     └── Sink (persistence)                ping, insert one by one, close
//!             ├── MongoStore
//!             └── MemoryStore (persistence disabled)
//! ```
//!
//! Every stage runs once, in order, on a single thread. There is no
//! batching, no upsert, and no retry: running the load twice against the
//! same collection stores every document twice.

pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod persistence;
pub mod service;
