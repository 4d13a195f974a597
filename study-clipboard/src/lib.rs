//! Study Clipboard - shared drag-and-drop clipboard for the study space
//!
//! A headless widget that captures dropped files, keeps the newest ones in a
//! durable SQLite store, renders them onto a host [`surface::Surface`], and
//! keeps every open instance in step through a [`sync::NotificationChannel`].
//!
//! Uploads to a remote file service and text snippet extraction run as
//! background enrichment tasks and never block capture.

pub mod capture;
pub mod config;
pub mod database;
mod debounce;
pub mod durable;
pub mod enrichment;
pub mod interface;
pub mod models;
pub mod panel;
pub mod preview;
pub mod render;
pub mod surface;
pub mod sync;
pub mod upload;
pub mod widget;

pub use interface::*;
pub use widget::{ClipboardWidget, PointerRect, WidgetDeps, WidgetHandle};
