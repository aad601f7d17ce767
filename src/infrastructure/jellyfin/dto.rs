//! Jellyfin wire types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    Album, Artist, MediaLibrary, RemoteSession, ServerInfo, Track,
};

/// `POST Users/AuthenticateByName` body.
#[derive(Debug, Serialize)]
pub struct AuthenticateByNameRequest<'a> {
    #[serde(rename = "Username")]
    pub username: &'a str,
    #[serde(rename = "Pw")]
    pub pw: &'a str,
}

/// `POST Sessions/{id}/Playing` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayRequest<'a> {
    pub item_ids: Vec<&'a str>,
    pub play_command: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub user: UserDto,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicSystemInfoDto {
    #[serde(default)]
    pub server_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub id: String,
}

impl From<PublicSystemInfoDto> for ServerInfo {
    fn from(dto: PublicSystemInfoDto) -> Self {
        Self {
            server_name: dto.server_name,
            version: dto.version,
            id: dto.id,
        }
    }
}

/// Envelope of every `Items` style query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_record_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NameDto {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDataDto {
    #[serde(default)]
    pub is_favorite: bool,
}

/// Subset of `BaseItemDto` used by the music views.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BaseItemDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub collection_type: Option<String>,
    #[serde(default)]
    pub image_tags: HashMap<String, String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub production_year: Option<i32>,
    #[serde(default)]
    pub album_artists: Vec<NameDto>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub album_id: Option<String>,
    pub album_primary_image_tag: Option<String>,
    pub index_number: Option<u32>,
    pub run_time_ticks: Option<u64>,
    pub user_data: Option<UserDataDto>,
}

impl From<BaseItemDto> for MediaLibrary {
    fn from(dto: BaseItemDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            collection_type: dto.collection_type,
        }
    }
}

impl From<BaseItemDto> for Artist {
    fn from(dto: BaseItemDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            image_tags: dto.image_tags,
            genres: dto.genres,
            production_year: dto.production_year,
        }
    }
}

impl From<BaseItemDto> for Album {
    fn from(dto: BaseItemDto) -> Self {
        Self {
            id: dto.id,
            title: dto.name,
            production_year: dto.production_year,
            album_artists: dto.album_artists.into_iter().map(|a| a.name).collect(),
            is_favorite: dto.user_data.is_some_and(|d| d.is_favorite),
            image_tags: dto.image_tags,
        }
    }
}

impl From<BaseItemDto> for Track {
    fn from(dto: BaseItemDto) -> Self {
        let album_artist = dto
            .album_artist
            .or_else(|| dto.album_artists.into_iter().next().map(|a| a.name));
        Self {
            id: dto.id,
            title: dto.name,
            album_id: dto.album_id,
            album: dto.album,
            album_artist,
            index_number: dto.index_number,
            run_time_ticks: dto.run_time_ticks,
            album_image_tag: dto.album_primary_image_tag,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NowPlayingDto {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionInfoDto {
    pub id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub device_name: String,
    pub now_playing_item: Option<NowPlayingDto>,
    #[serde(default)]
    pub supports_remote_control: bool,
}

impl From<SessionInfoDto> for RemoteSession {
    fn from(dto: SessionInfoDto) -> Self {
        Self {
            id: dto.id,
            user_name: dto.user_name,
            client: dto.client,
            device_name: dto.device_name,
            now_playing_item_id: dto.now_playing_item.map(|item| item.id),
            supports_remote_control: dto.supports_remote_control,
        }
    }
}
