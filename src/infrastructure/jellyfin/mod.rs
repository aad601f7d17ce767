//! Jellyfin server adapter.

mod client;
mod dto;

pub use client::JellyfinClient;
