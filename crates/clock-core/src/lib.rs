//! Platform-agnostic core of the CYD wall clock.
//!
//! Everything in here is `no_std` and runs on the host for tests. Hardware
//! lives behind the collaborator traits in [`connection`], [`sync`],
//! [`input`], [`settings`] and [`app::Board`].

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod connection;
pub mod error;
pub mod input;
pub mod mailbox;
pub mod render;
pub mod screens;
pub mod settings;
pub mod sync;
pub mod timing;
pub mod tz;
