//! Token launchpad listings SDK.
//!
//! # Overview
//!
//! Keeps a bounded, newest-first view of the sales registered by a launchpad
//! factory contract, read through any JSON-RPC provider.
//!
//! Use [`sync::Synchronizer`] with a [`source::RpcSource`] to resolve the
//! factory deployed on the connected chain, verify it, and publish the fee
//! together with the most recent listings. Subscribe to the published state
//! with [`sync::Synchronizer::subscribe`].
//!
//! [`page::Page`] tracks account and panel state around the listings and
//! tells when a refresh is due.
//!
//! See `./tests` for examples.
//!
//! # Limitations/follow-ups
//!
//! * Listings are refreshed on request or interval; factory events are not
//!   streamed.
//!
//! * Only the newest sales within the listings cap are read, there is no
//!   pagination over older ones.
//!
//! # Features
//!
//! | Feature | Default | Description |
//! | --- | --- | --- |
//! | `display` | yes | Enables table rendering of [`types::TokenView`]. |
//! | `testing` | yes | Enables [`testing`] module. |
//!
//! # Testing
//!
//! [`testing`] module provides an in-memory chain with call counters and
//! failure injection, serving the factory reads.

pub mod abi;
pub mod config;
pub mod error;
pub mod factory;
pub mod network;
pub mod num;
pub mod page;
pub mod source;
pub mod sync;
#[cfg(feature = "testing")]
pub mod testing;
pub mod types;
pub mod view;
