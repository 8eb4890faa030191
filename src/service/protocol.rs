//! Request/response boundary of the live service
//!
//! Every per-stage error is folded here into one generic error body. The
//! live path only yields a track id; title, artist and cover are resolved
//! after the batch, and queries only read what is already cached.

use super::live::LiveService;
use crate::catalog::{AssetKey, TrackCatalog};
use crate::error::{IngestError, MalformedInputError};
use crate::metadata::MetadataResolver;
use crate::model::{RawSample, Track, TrackMetadata};
use serde::{Deserialize, Serialize};

/// Body of every failure response
pub const GENERIC_ERROR: &str = "Error processing data";

/// Incoming request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Request {
    Ingest(Vec<RawSample>),
    Query,
}

/// Accepted wire shapes: a tagged request or a bare sample array
#[derive(Deserialize)]
#[serde(untagged)]
enum WireRequest {
    Batch(Vec<RawSample>),
    Tagged(Request),
}

impl Request {
    pub fn parse(text: &str) -> Result<Self, MalformedInputError> {
        match serde_json::from_str::<WireRequest>(text) {
            Ok(WireRequest::Batch(batch)) => Ok(Request::Ingest(batch)),
            Ok(WireRequest::Tagged(request)) => Ok(request),
            Err(e) => Err(MalformedInputError::Undecodable(e.to_string())),
        }
    }
}

/// Coarse outcome class, mirroring HTTP 200/400/500
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    BadRequest,
    Internal,
}

impl ResponseStatus {
    pub fn code(self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::BadRequest => 400,
            ResponseStatus::Internal => 500,
        }
    }
}

/// Selection as reported to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResponse {
    pub jumps_per_minute: f64,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub song_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub song_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub song_artist: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub song_cover_path: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Response ready to be written back
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Selection(SelectionResponse),
    Failure(ResponseStatus),
}

impl Reply {
    pub fn status(&self) -> ResponseStatus {
        match self {
            Reply::Selection(_) => ResponseStatus::Ok,
            Reply::Failure(status) => *status,
        }
    }

    pub fn to_json(&self) -> String {
        let encoded = match self {
            Reply::Selection(body) => serde_json::to_string(body),
            Reply::Failure(_) => serde_json::to_string(&ErrorBody { error: GENERIC_ERROR }),
        };
        encoded.unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", GENERIC_ERROR))
    }
}

/// Front door of the service: decodes requests and renders replies
pub struct RequestHandler<C: TrackCatalog> {
    service: LiveService<C>,
    metadata: MetadataResolver,
}

impl<C: TrackCatalog> RequestHandler<C> {
    pub fn new(service: LiveService<C>, metadata: MetadataResolver) -> Self {
        Self { service, metadata }
    }

    pub fn service(&self) -> &LiveService<C> {
        &self.service
    }

    /// Handle one raw request body
    pub fn handle_text(&self, text: &str) -> Reply {
        match Request::parse(text) {
            Ok(request) => self.handle(request),
            Err(e) => {
                log::warn!("Error processing data: {}", e);
                Reply::Failure(ResponseStatus::BadRequest)
            }
        }
    }

    pub fn metadata(&self) -> &MetadataResolver {
        &self.metadata
    }

    pub fn handle(&self, request: Request) -> Reply {
        match request {
            Request::Ingest(batch) => match self.service.ingest(&batch) {
                Ok(outcome) => {
                    // The published state may already belong to a later batch
                    let track = outcome.selection.track();
                    let metadata = track.map(|t| self.metadata.resolve(t));
                    Reply::Selection(selection_response(outcome.rate.rate_per_minute, track, metadata))
                }
                Err(e) => {
                    log::warn!("Error processing data: {}", e);
                    Reply::Failure(failure_status(&e))
                }
            },
            Request::Query => {
                let state = self.service.query();
                let track = state.last_track.as_ref();
                let metadata = track.map(|t| self.metadata.lookup(t));
                Reply::Selection(selection_response(state.last_rate, track, metadata))
            }
        }
    }
}

fn selection_response(
    jumps_per_minute: f64,
    track: Option<&Track>,
    metadata: Option<TrackMetadata>,
) -> SelectionResponse {
    let metadata = metadata.unwrap_or_default();
    SelectionResponse {
        jumps_per_minute,
        song_path: track.and_then(track_asset_path),
        song_name: metadata.title,
        song_artist: metadata.artist,
        song_cover_path: metadata.cover_key,
    }
}

fn failure_status(error: &IngestError) -> ResponseStatus {
    match error {
        IngestError::Malformed(_) => ResponseStatus::BadRequest,
        IngestError::Catalog(_) => ResponseStatus::Internal,
    }
}

/// Encoded asset key of a track's audio file
fn track_asset_path(track: &Track) -> Option<String> {
    AssetKey::from_segments(track.id.split('/').map(str::to_string))
        .map(|key| key.encoded())
        .ok()
}
