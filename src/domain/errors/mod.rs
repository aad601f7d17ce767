//! Domain error types.

mod api_error;
mod audio_error;
mod secret_error;

pub use api_error::ApiError;
pub use audio_error::AudioError;
pub use secret_error::SecretError;
