//! Client for a list of priced notes kept in a managed GraphQL API, with
//! optional images in object storage.
//!
//! [`controller::NoteListController`] holds the working set and runs every
//! operation against two collaborators: [`api::NotesApi`] for records and
//! [`storage::BlobStore`] for images. [`server`] provides an in-memory
//! stand-in for both services.

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;
pub mod server;
pub mod storage;

pub use controller::{NoteListController, SyncMode};
pub use error::{ClientError, NotesError};

use api::GraphqlClient;
use auth::Credentials;
use config::Config;
use storage::HttpBlobStore;

/// Controller wired to the HTTP collaborators.
pub type HttpController = NoteListController<GraphqlClient, HttpBlobStore>;

/// Build a controller for `config`, authenticated with `credentials`.
pub fn connect(config: &Config, credentials: &Credentials) -> HttpController {
    let token = Some(credentials.token().to_string());
    let api = GraphqlClient::new(&config.api_url, token.clone());
    let storage =
        HttpBlobStore::new(&config.storage_url, token).with_expiry_secs(config.url_expiry_secs);
    NoteListController::new(api, storage).with_sync_mode(config.sync_mode)
}
