//! Audio output adapters.

mod external_player;

pub use external_player::ExternalPlayerBackend;
