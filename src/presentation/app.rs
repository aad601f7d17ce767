//! Command dispatch for the `jambox` binary.

use std::io::Write;
use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::dto::LoginRequest;
use crate::application::services::PlaybackController;
use crate::application::use_cases::{AlbumSort, LibraryBrowser, LoginUseCase, TrackSort};
use crate::domain::entities::{BackendEvent, PlaybackEvent, PlaybackState, Session};
use crate::domain::errors::ApiError;
use crate::domain::ports::{AlbumScope, CredentialStoragePort, JellyfinPort, TrackScope};
use crate::infrastructure::audio::ExternalPlayerBackend;
use crate::infrastructure::config::{AppConfig, Command, LibraryArgs, LoginArgs, StateConfig, StorageManager};
use crate::infrastructure::image::MemoryImageCache;
use crate::presentation::output::{
    albums_table, artists_table, libraries_table, sessions_table, tracks_table,
};

/// Wires use cases to adapters and runs one command.
pub struct App {
    config: AppConfig,
    storage: StorageManager,
    state: StateConfig,
    jellyfin: Arc<dyn JellyfinPort>,
    login: LoginUseCase,
    images: Arc<MemoryImageCache>,
}

impl App {
    /// Creates the application.
    #[must_use]
    pub fn new(
        config: AppConfig,
        storage: StorageManager,
        state: StateConfig,
        jellyfin: Arc<dyn JellyfinPort>,
        credentials: Arc<dyn CredentialStoragePort>,
        images: Arc<MemoryImageCache>,
    ) -> Self {
        let login = LoginUseCase::new(jellyfin.clone(), credentials);
        Self {
            config,
            storage,
            state,
            jellyfin,
            login,
            images,
        }
    }

    /// Runs `command`, writing human readable output to `out`.
    ///
    /// # Errors
    /// Returns error if the command fails.
    pub async fn run<W: Write + Send>(&mut self, command: Command, out: &mut W) -> Result<()> {
        debug!(command = ?command, "Running command");
        match command {
            Command::Login(args) => self.log_in(args, out).await,
            Command::Logout => {
                self.login.logout(self.images.as_ref()).await?;
                writeln!(out, "Logged out")?;
                Ok(())
            }
            Command::Libraries => {
                let browser = self.browser().await?;
                let libraries = browser.libraries().await?;
                write!(out, "{}", libraries_table(&libraries).render())?;
                Ok(())
            }
            Command::Artists { library, sort } => {
                let browser = self.browser().await?;
                let library_id = self.resolve_library(&browser, &library).await?;
                let artists = browser.artists(&library_id, sort).await?;
                writeln!(out, "{} ARTISTS ({sort})", artists.len())?;
                write!(out, "{}", artists_table(&artists).render())?;
                Ok(())
            }
            Command::Albums {
                library,
                artist,
                sort,
            } => {
                let browser = self.browser().await?;
                let scope = self.album_scope(&browser, &library, artist).await?;
                let scoped_to_artist = matches!(scope, AlbumScope::Artist(_));
                let albums = browser.albums(&scope, sort).await?;
                writeln!(out, "{} ALBUMS ({sort})", albums.len())?;
                write!(out, "{}", albums_table(&albums, scoped_to_artist).render())?;
                Ok(())
            }
            Command::Tracks {
                library,
                artist,
                album,
                sort,
            } => {
                let browser = self.browser().await?;
                let library_id = if artist.is_none() && album.is_none() {
                    self.resolve_library(&browser, &library).await?
                } else {
                    String::new()
                };
                let scope =
                    TrackScope::from_selection(&library_id, artist.as_deref(), album.as_deref());
                let tracks = browser.tracks(&scope, sort).await?;
                writeln!(out, "{} TRACKS ({sort})", tracks.len())?;
                write!(out, "{}", tracks_table(&tracks).render())?;
                Ok(())
            }
            Command::Search { query } => {
                let browser = self.browser().await?;
                let tracks = browser.search(&query).await?;
                writeln!(out, "{} TRACKS matching \"{}\"", tracks.len(), query.trim())?;
                write!(out, "{}", tracks_table(&tracks).render())?;
                Ok(())
            }
            Command::Sessions => {
                let session = self.session().await?;
                let sessions = self.jellyfin.sessions(&session).await?;
                write!(out, "{}", sessions_table(&sessions).render())?;
                Ok(())
            }
            Command::RemotePlay { session: target, track } => {
                let session = self.session().await?;
                self.jellyfin
                    .play_on_session(&session, &target, &track)
                    .await?;
                writeln!(out, "Sent {track} to session {target}")?;
                Ok(())
            }
            Command::StreamUrl { track, container } => {
                let session = self.session().await?;
                writeln!(out, "{}", session.stream_url(&track, &container))?;
                Ok(())
            }
            Command::Covers { library, artist } => self.covers(&library, artist, out).await,
            Command::Play {
                album,
                search,
                start,
            } => self.play(album, search, start, out).await,
        }
    }

    async fn log_in<W: Write + Send>(&mut self, args: LoginArgs, out: &mut W) -> Result<()> {
        let mut request = LoginRequest::new(args.server, args.username, args.password);
        if args.no_save {
            request = request.without_persistence();
        }

        let response = self.login.execute(request).await?;

        writeln!(
            out,
            "Logged in as {} on {}",
            response.session.user_name(),
            response.server_info
        )?;
        if response.credentials_persisted {
            writeln!(out, "Credentials saved to the system keyring")?;
        }
        Ok(())
    }

    async fn session(&self) -> Result<Session> {
        match self.login.resume().await {
            Ok(response) => Ok(response.session),
            Err(ApiError::NotAuthenticated) => {
                Err(eyre!("not logged in, run `jambox login` first"))
            }
            Err(e) => Err(e).wrap_err("could not restore the saved session"),
        }
    }

    async fn browser(&self) -> Result<LibraryBrowser> {
        Ok(LibraryBrowser::new(self.jellyfin.clone(), self.session().await?))
    }

    /// Explicit library, else the last used one, else the first music library.
    async fn resolve_library(&mut self, browser: &LibraryBrowser, args: &LibraryArgs) -> Result<String> {
        let library_id = if let Some(id) = &args.library {
            id.clone()
        } else if let Some(id) = &self.state.last_library_id {
            return Ok(id.clone());
        } else {
            browser
                .default_library()
                .await?
                .map(|library| library.id)
                .ok_or_else(|| eyre!("no music library found, pass --library"))?
        };

        if self.state.last_library_id.as_ref() != Some(&library_id) {
            self.state.last_library_id = Some(library_id.clone());
            if let Err(e) = self.storage.save_state(&self.state) {
                warn!(error = %e, "Failed to remember library");
            }
        }
        Ok(library_id)
    }

    async fn album_scope(
        &mut self,
        browser: &LibraryBrowser,
        library: &LibraryArgs,
        artist: Option<String>,
    ) -> Result<AlbumScope> {
        match artist {
            Some(artist_id) => Ok(AlbumScope::Artist(artist_id)),
            None => Ok(AlbumScope::Library(
                self.resolve_library(browser, library).await?,
            )),
        }
    }

    async fn covers<W: Write + Send>(
        &mut self,
        library: &LibraryArgs,
        artist: Option<String>,
        out: &mut W,
    ) -> Result<()> {
        let browser = self.browser().await?;
        let scope = self.album_scope(&browser, library, artist).await?;
        let albums = browser.albums(&scope, AlbumSort::Name).await?;

        let size = self.config.images.artwork_size();
        let urls: Vec<Option<String>> = albums
            .iter()
            .map(|album| album.primary_image_url(browser.session(), size))
            .collect();
        let bitmaps = self.images.get_all(&urls).await;

        for (album, bitmap) in albums.iter().zip(&bitmaps) {
            match bitmap {
                Some(bitmap) => {
                    writeln!(out, "{}x{}  {}", bitmap.width(), bitmap.height(), album.title)?;
                }
                None => writeln!(out, "-      {}", album.title)?,
            }
        }
        writeln!(out, "{}", self.images.stats())?;
        Ok(())
    }

    async fn play<W: Write + Send>(
        &mut self,
        album: Option<String>,
        search: Option<String>,
        start: usize,
        out: &mut W,
    ) -> Result<()> {
        let browser = self.browser().await?;
        let tracks = match (album, search) {
            (Some(album_id), _) => {
                browser
                    .tracks(&TrackScope::Album(album_id), TrackSort::AlbumOrder)
                    .await?
            }
            (None, Some(query)) => browser.search(&query).await?,
            (None, None) => Vec::new(),
        };
        if tracks.is_empty() {
            return Err(eyre!("nothing to play"));
        }
        let total = tracks.len();
        if start >= total {
            return Err(eyre!("start index {start} out of range ({total} tracks)"));
        }

        let (backend_tx, mut backend_rx) = mpsc::unbounded_channel::<BackendEvent>();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PlaybackEvent>();
        let backend = Arc::new(ExternalPlayerBackend::new(
            self.config.player.command.clone(),
            self.config.player.args.clone(),
            backend_tx,
        ));
        let mut controller =
            PlaybackController::new(backend, browser.session().clone(), event_tx);

        controller.set_playlist(tracks, start);
        controller
            .play()
            .await
            .wrap_err_with(|| format!("could not start `{}`", self.config.player.command))?;
        info!(total, start, "Playback started");

        loop {
            while let Ok(event) = event_rx.try_recv() {
                print_event(out, &event, total)?;
            }
            if controller.state() == PlaybackState::Stopped {
                break;
            }

            tokio::select! {
                Some(event) = backend_rx.recv() => {
                    controller.handle_backend_event(event).await?;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping playback");
                    controller.stop()?;
                }
            }
        }

        while let Ok(event) = event_rx.try_recv() {
            print_event(out, &event, total)?;
        }
        Ok(())
    }
}

fn print_event<W: Write>(out: &mut W, event: &PlaybackEvent, total: usize) -> std::io::Result<()> {
    match event {
        PlaybackEvent::TrackChanged { track, index } => writeln!(
            out,
            "[{}/{total}] {} - {}",
            index + 1,
            track.title,
            track.artist()
        ),
        PlaybackEvent::StateChanged(state) => writeln!(out, "({state})"),
        PlaybackEvent::PositionChanged {
            elapsed, remaining, ..
        } => writeln!(out, "{elapsed} {remaining}"),
        PlaybackEvent::VolumeChanged(volume) => writeln!(out, "volume {volume}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        AccessToken, Album, ClientIdentity, MediaLibrary, ServerInfo, ServerUrl, UserCredentials,
    };
    use crate::domain::ports::mocks::{MockCredentialStorage, MockImageFetcher, MockJellyfinPort};
    use tempfile::TempDir;

    fn logged_in_storage() -> Arc<MockCredentialStorage> {
        Arc::new(MockCredentialStorage::with_credentials(UserCredentials::new(
            "http://jf", "alice", "pw",
        )))
    }

    fn jellyfin() -> MockJellyfinPort {
        let mut jellyfin = MockJellyfinPort::new();
        jellyfin.expect_public_system_info().returning(|_| {
            Ok(ServerInfo {
                server_name: "Den".to_string(),
                version: "10.9.0".to_string(),
                id: "srv".to_string(),
            })
        });
        jellyfin.expect_authenticate().returning(|url, user, _| {
            Ok(Session::new(
                url.clone(),
                "user-1",
                user,
                AccessToken::new_unchecked("tok"),
                ClientIdentity::new("dev"),
            ))
        });
        jellyfin
    }

    fn app(
        jellyfin: MockJellyfinPort,
        credentials: Arc<MockCredentialStorage>,
        fetcher: MockImageFetcher,
    ) -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(
            AppConfig::default(),
            StorageManager::with_dir(dir.path().to_path_buf()),
            StateConfig::default(),
            Arc::new(jellyfin),
            credentials,
            Arc::new(MemoryImageCache::new(Arc::new(fetcher), 10)),
        );
        (app, dir)
    }

    async fn run(app: &mut App, command: Command) -> Result<String> {
        let mut out = Vec::new();
        app.run(command, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_commands_require_login() {
        let (mut app, _dir) = app(
            MockJellyfinPort::new(),
            Arc::new(MockCredentialStorage::new()),
            MockImageFetcher::new(),
        );

        let err = run(&mut app, Command::Sessions).await.unwrap_err();

        assert!(err.to_string().contains("not logged in"));
    }

    #[tokio::test]
    async fn test_login_reports_user_and_server() {
        let storage = Arc::new(MockCredentialStorage::new());
        let (mut app, _dir) = app(jellyfin(), storage.clone(), MockImageFetcher::new());

        let output = run(
            &mut app,
            Command::Login(LoginArgs {
                server: "http://jf:8096".to_string(),
                username: "alice".to_string(),
                password: "pw".to_string(),
                no_save: false,
            }),
        )
        .await
        .unwrap();

        assert!(output.contains("Logged in as alice on Den (v10.9.0)"));
        assert!(storage.has_credentials().await.unwrap());
    }

    #[tokio::test]
    async fn test_stream_url_uses_stored_session() {
        let (mut app, _dir) = app(jellyfin(), logged_in_storage(), MockImageFetcher::new());

        let output = run(
            &mut app,
            Command::StreamUrl {
                track: "t1".to_string(),
                container: "flac".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            output.trim(),
            "http://jf/Audio/t1/universal?UserId=user-1&DeviceId=dev&Container=flac&api_key=tok"
        );
    }

    #[tokio::test]
    async fn test_default_library_is_remembered() {
        let mut jellyfin = jellyfin();
        jellyfin.expect_media_libraries().times(1).returning(|_| {
            Ok(vec![MediaLibrary {
                id: "music".to_string(),
                name: "Music".to_string(),
                collection_type: Some("music".to_string()),
            }])
        });
        jellyfin
            .expect_artists()
            .withf(|_, library| library == "music")
            .times(2)
            .returning(|_, _| Ok(Vec::new()));
        let (mut app, dir) = app(jellyfin, logged_in_storage(), MockImageFetcher::new());

        let artists = || Command::Artists {
            library: LibraryArgs::default(),
            sort: crate::application::use_cases::ArtistSort::NameAsc,
        };
        run(&mut app, artists()).await.unwrap();
        let output = run(&mut app, artists()).await.unwrap();

        assert!(output.starts_with("0 ARTISTS (A-Z)"));
        let saved = StorageManager::with_dir(dir.path().to_path_buf())
            .load_state()
            .unwrap();
        assert_eq!(saved.last_library_id.as_deref(), Some("music"));
    }

    #[tokio::test]
    async fn test_covers_load_through_cache() {
        let mut jellyfin = jellyfin();
        jellyfin.expect_albums().returning(|_, _| {
            Ok(vec![
                Album {
                    id: "a1".to_string(),
                    title: "With Cover".to_string(),
                    image_tags: [("Primary".to_string(), "tag".to_string())].into(),
                    ..Album::default()
                },
                Album {
                    id: "a2".to_string(),
                    title: "No Cover".to_string(),
                    ..Album::default()
                },
            ])
        });
        let session = Session::new(
            ServerUrl::parse("http://jf").unwrap(),
            "user-1",
            "alice",
            AccessToken::new_unchecked("tok"),
            ClientIdentity::new("dev"),
        );
        let cover_url = crate::domain::entities::primary_image_url(
            &session,
            "a1",
            Some("tag"),
            AppConfig::default().images.artwork_size(),
        )
        .unwrap();
        let fetcher = MockImageFetcher::new().with_image(&cover_url, 30, 20);
        let (mut app, _dir) = app(jellyfin, logged_in_storage(), fetcher);

        let output = run(
            &mut app,
            Command::Covers {
                library: LibraryArgs {
                    library: Some("lib".to_string()),
                },
                artist: None,
            },
        )
        .await
        .unwrap();

        assert!(output.contains("30x20  With Cover"));
        assert!(output.contains("-      No Cover"));
        assert!(output.contains("Cache: 1/10 images"));
    }

    #[tokio::test]
    async fn test_logout_forgets_credentials() {
        let storage = logged_in_storage();
        let (mut app, _dir) = app(MockJellyfinPort::new(), storage.clone(), MockImageFetcher::new());

        let output = run(&mut app, Command::Logout).await.unwrap();

        assert_eq!(output.trim(), "Logged out");
        assert!(!storage.has_credentials().await.unwrap());
    }

    #[tokio::test]
    async fn test_play_with_empty_search_fails() {
        let mut jellyfin = jellyfin();
        jellyfin
            .expect_search_tracks()
            .returning(|_, _| Ok(Vec::new()));
        let (mut app, _dir) = app(jellyfin, logged_in_storage(), MockImageFetcher::new());

        let err = run(
            &mut app,
            Command::Play {
                album: None,
                search: Some("nothing".to_string()),
                start: 0,
            },
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("nothing to play"));
    }

    #[tokio::test]
    async fn test_play_rejects_start_past_end() {
        let mut jellyfin = jellyfin();
        jellyfin.expect_search_tracks().returning(|_, _| {
            Ok(vec![crate::domain::entities::Track {
                id: "t1".to_string(),
                title: "Only".to_string(),
                ..Default::default()
            }])
        });
        let (mut app, _dir) = app(jellyfin, logged_in_storage(), MockImageFetcher::new());
        app.config.player.command = "jambox-test-no-such-player".to_string();

        let err = run(
            &mut app,
            Command::Play {
                album: None,
                search: Some("only".to_string()),
                start: 3,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "start index 3 out of range (1 tracks)");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_play_runs_through_album() {
        let mut jellyfin = jellyfin();
        jellyfin.expect_tracks().returning(|_, _| {
            Ok(vec![
                crate::domain::entities::Track {
                    id: "t2".to_string(),
                    title: "Second".to_string(),
                    index_number: Some(2),
                    ..Default::default()
                },
                crate::domain::entities::Track {
                    id: "t1".to_string(),
                    title: "First".to_string(),
                    index_number: Some(1),
                    ..Default::default()
                },
            ])
        });
        let (mut app, _dir) = app(jellyfin, logged_in_storage(), MockImageFetcher::new());
        app.config.player.command = "true".to_string();
        app.config.player.args = Vec::new();

        let output = run(
            &mut app,
            Command::Play {
                album: Some("alb".to_string()),
                search: None,
                start: 0,
            },
        )
        .await
        .unwrap();

        let first = output.find("[1/2] First").unwrap();
        let second = output.find("[2/2] Second").unwrap();
        assert!(first < second);
        assert!(output.trim_end().ends_with("(stopped)"));
    }
}
