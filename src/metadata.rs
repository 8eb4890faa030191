//! Track metadata and cover-art lookup
//!
//! Reads title/artist tags and the embedded cover image of a selected track.
//! Covers are resized to a single thumbnail size and written once to a
//! cover folder under the asset root, named by the hash of the picture.
//! Resolution is cached per track and runs outside the live critical section.
//! [`MetadataResolver::lookup`] only reads the cache.

use crate::catalog::AssetKey;
use crate::model::{Track, TrackMetadata};
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use lofty::picture::PictureType;
use lofty::prelude::*;
use lofty::probe::Probe;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Cover thumbnail edge length in pixels
pub const COVER_SIZE: u32 = 240;

/// JPEG quality for written covers
const COVER_QUALITY: u8 = 90;

/// Tags read from an audio file
struct TagData {
    title: Option<String>,
    artist: Option<String>,
    cover: Option<Vec<u8>>,
}

/// Resolves and caches [`TrackMetadata`] for catalog tracks
pub struct MetadataResolver {
    /// Root that asset keys are relative to
    asset_root: PathBuf,

    /// Where extracted covers are written
    cover_dir: PathBuf,

    /// Resolved metadata by track id
    cache: Mutex<HashMap<String, TrackMetadata>>,
}

impl MetadataResolver {
    pub fn new(asset_root: PathBuf, cover_dir: PathBuf) -> Self {
        Self {
            asset_root,
            cover_dir,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Metadata for `track`, reading tags on first use
    ///
    /// Never fails: unreadable tags or covers are logged and leave the
    /// corresponding fields empty. The title falls back to the file stem.
    pub fn resolve(&self, track: &Track) -> TrackMetadata {
        if let Some(ref supplied) = track.metadata {
            return supplied.clone();
        }

        if let Some(cached) = self.cache.lock().get(&track.id) {
            return cached.clone();
        }

        let tags = match read_tags(&track.file_path) {
            Ok(tags) => tags,
            Err(e) => {
                log::warn!("Failed to read tags for {}: {:#}", track.id, e);
                TagData {
                    title: None,
                    artist: None,
                    cover: None,
                }
            }
        };

        let cover_key = tags.cover.and_then(|data| match self.store_cover(&data) {
            Ok(key) => key,
            Err(e) => {
                log::warn!("Failed to store cover for {}: {:#}", track.id, e);
                None
            }
        });

        let metadata = TrackMetadata {
            title: tags.title.or_else(|| track.stem()),
            artist: tags.artist,
            cover_key,
        };

        self.cache.lock().insert(track.id.clone(), metadata.clone());
        metadata
    }

    /// Metadata for `track` without touching the file system
    ///
    /// Uncached tracks get only the file stem as title.
    pub fn lookup(&self, track: &Track) -> TrackMetadata {
        if let Some(ref supplied) = track.metadata {
            return supplied.clone();
        }

        self.cache
            .lock()
            .get(&track.id)
            .cloned()
            .unwrap_or_else(|| TrackMetadata {
                title: track.stem(),
                ..TrackMetadata::default()
            })
    }

    /// Number of tracks with cached metadata
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    /// Write the cover thumbnail if not already present and return its key
    fn store_cover(&self, data: &[u8]) -> Result<Option<String>> {
        let hash = format!("{:x}", md5::compute(data));
        let path = self.cover_dir.join(format!("{}.jpg", hash));

        if !path.exists() {
            let thumbnail = encode_thumbnail(data)?;
            fs::create_dir_all(&self.cover_dir)
                .with_context(|| format!("Failed to create cover directory: {}", self.cover_dir.display()))?;
            fs::write(&path, thumbnail)
                .with_context(|| format!("Failed to write cover: {}", path.display()))?;
            log::debug!("Wrote cover {}", path.display());
        }

        Ok(self.asset_key(&path))
    }

    /// Encoded asset key for a path under the asset root
    fn asset_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.asset_root).ok()?;
        let segments = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned());
        AssetKey::from_segments(segments).ok().map(|k| k.encoded())
    }
}

fn read_tags(path: &Path) -> Result<TagData> {
    let tagged_file = Probe::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?
        .read()
        .with_context(|| format!("Failed to read tags from: {}", path.display()))?;

    let mut data = TagData {
        title: None,
        artist: None,
        cover: None,
    };

    for tag in tagged_file.tags() {
        if data.title.is_none() {
            data.title = tag.title().map(|t| t.into_owned());
        }
        if data.artist.is_none() {
            data.artist = tag.artist().map(|a| a.into_owned());
        }
        if data.cover.is_none() {
            // Front cover first, then any picture
            data.cover = tag
                .pictures()
                .iter()
                .find(|p| p.pic_type() == PictureType::CoverFront)
                .or_else(|| tag.pictures().first())
                .map(|p| p.data().to_vec());
        }
    }

    Ok(data)
}

/// Decode, resize to the thumbnail size and re-encode as JPEG
fn encode_thumbnail(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).context("Failed to decode cover image")?;
    let resized = img.resize_exact(COVER_SIZE, COVER_SIZE, FilterType::Lanczos3);

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut buffer = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, COVER_QUALITY))
        .context("Failed to encode JPEG")?;
    Ok(buffer)
}
