//! Stripe → Moneybird Sync Library
//!
//! Incrementally copies Stripe payments into a Moneybird administration as
//! external sales invoices, creating the paying contact when it does not
//! exist yet.
//!
//! # Modules
//!
//! - `core`: Sync logic (cursor, contact resolution, invoice mapping).
//! - `integrations`: External service clients (Stripe, Moneybird).
//! - `config`: Configuration management.
//! - `contacts`: Natural-key contact find-or-create.
//! - `cursor`: File-backed sync watermark.
//! - `errors`: Error handling types.
//! - `invoices`: Payment to external sales invoice mapping.
//! - `models`: Stripe and Moneybird data models.
//! - `moneybird_client`: Moneybird API client.
//! - `stripe_client`: Stripe API client.
//! - `sync`: One synchronization run.

pub mod core;
pub mod integrations;

pub mod config;
pub mod contacts;
pub mod cursor;
pub mod errors;
pub mod invoices;
pub mod models;
pub mod moneybird_client;
pub mod stripe_client;
pub mod sync;
