//! Use case implementations.

mod browse_library;
mod login_use_case;

pub use browse_library::{AlbumSort, ArtistSort, LibraryBrowser, TrackSort};
pub use login_use_case::LoginUseCase;
