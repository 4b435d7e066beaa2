//! guestbook-core: archival entry store and bubble layout engine for the guestbook
//!
//! Two halves that share nothing but the [`Entry`] type:
//!
//! - Server side: [`ArchivalStore`] keeps a capped active log and moves
//!   overflow into fixed-size archive chunks. [`StoreHandle`] serializes
//!   writes through a single writer thread.
//! - Page side: [`compute_layout`] and [`BubbleBoard`] place entries as
//!   floating bubbles, [`render_bubble`] turns them into markup, and
//!   [`UiController`] drives the whole page against a [`GuestbookApi`].
//!
//! # Quick Start
//!
//! ```no_run
//! use guestbook_core::{ArchivalStore, StorageConfig, StoreHandle};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ArchivalStore::open("./data", StorageConfig::default())?;
//!     store.enforce_cap()?;
//!     let handle = StoreHandle::spawn(store)?;
//!
//!     let entry = handle.append(None, Some("반가워요")).await?;
//!     println!("stored {} at {}", entry.id, entry.display_date);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod bubble;
pub mod client;
pub mod config;
pub mod controller;
pub mod entry;
pub mod error;
pub mod layout;
pub mod render;
pub mod safe_io;
pub mod store;
pub mod writer;

pub use archive::{ArchiveChain, ArchiveReport};
pub use bubble::{Bubble, BubbleState};
pub use client::{ClientError, GuestbookApi, HttpClient};
pub use config::StorageConfig;
pub use controller::UiController;
pub use entry::{Entry, NewEntry};
pub use error::{GuestbookError, Result};
pub use layout::{BubbleBoard, Placement, Viewport, compute_layout};
pub use render::{BubbleView, render_bubble};
pub use store::{ArchivalStore, StorePaths};
pub use writer::StoreHandle;
