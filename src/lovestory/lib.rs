//! # Lovestory Architecture
//!
//! Lovestory is a **UI-agnostic personal-memories library**: a scrapbook of
//! photos and videos with favorites, comment threads, a guestbook and ZIP
//! backup. The bundled CLI is just one client of the library; any other
//! surface (a web view, a desktop shell) would call the same API.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (args.rs, wired by main.rs)                      │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over the repositories                        │
//! │  - Owns the one backend handle and the install's client id  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repositories (media.rs, guestbook.rs, settings.rs)         │
//! │  - Business logic over plain data types                     │
//! │  - Absorb backend failures: log + sentinel, never a panic   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract StoreBackend trait over four key/value          │
//! │    partitions plus payload primitives                       │
//! │  - FileStore (local), RemoteStore (hosted), InMemoryStore   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular arguments, returns regular
//! types, and never touches stdout/stderr or `std::process::exit`. The
//! backend handle is constructed once at startup and passed in; nothing in
//! the core reaches for a global.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`media`]: The gallery: uploads, favorites, comments, reactions
//! - [`guestbook`]: Free-standing messages with replies and per-client reactions
//! - [`settings`]: The single settings record
//! - [`export`]: ZIP backup of the whole gallery
//! - [`seed`]: Optional demo content for a fresh install
//! - [`store`]: Storage abstraction and the three implementations
//! - [`model`]: Core data types
//! - [`client`]: The per-install client id token
//! - [`config`]: Install configuration (backend choice, default author)
//! - [`error`]: Error types

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod guestbook;
pub mod media;
pub mod model;
pub mod seed;
pub mod settings;
pub mod store;
