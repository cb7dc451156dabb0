//! # Tech KB
//!
//! A personal knowledge base of technology entries. A free-text description
//! goes in; a language model produces a summary, categories, use cases, and
//! links; an illustrative image is found or generated; the record is stored
//! in SQLite or a flat JSON file. Stored entries can be listed, filtered by
//! category, deleted, and searched semantically by the same model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────────────┐
//! │   CLI    │──▶│ Actions  │──▶│ Store             │
//! │   (kb)   │   │ add/list │   │ SQLite | JSON file│
//! └──────────┘   │ search/  │   └───────────────────┘
//! ┌──────────┐   │ delete   │   ┌───────────────────┐
//! │   HTTP   │──▶│          │──▶│ AI collaborators  │
//! │  (axum)  │   └──────────┘   │ summary/image/    │
//! └──────────┘                  │ search            │
//!                               └───────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! kb init                         # create database
//! kb add "LangChain"              # summarize and store
//! kb list --category "AI/ML"
//! kb search "build a chatbot over my docs"
//! kb serve                        # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Handler error taxonomy and result shape |
//! | [`store`] | Record store trait and backends |
//! | [`ai`] | AI collaborators |
//! | [`actions`] | Request handlers |
//! | [`server`] | HTTP server |
//! | [`import`] | JSON → SQLite loader |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod actions;
pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod migrate;
pub mod models;
pub mod server;
pub mod store;
