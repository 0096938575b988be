//! Monster image requests.
//!
//! Images come from an external generator keyed by monster name. The cache
//! hands out at most one request ticket per name; a ticket resolves on its
//! own task and is fed back through [`MonsterImageCache::finish`]. Generator
//! failures resolve to a deterministic placeholder, so a request never fails.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const LOG_TARGET: &str = "spawn_editor::imagery";

/// Default base of the placeholder image service.
pub const DEFAULT_PLACEHOLDER_BASE: &str = "https://picsum.photos/seed";

/// Reference to an image, usually a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why the generator could not produce an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image service unavailable: {0}")]
    Unavailable(String),
    #[error("image service rejected {name:?}: {reason}")]
    Rejected { name: String, reason: String },
}

/// External image generation service.
pub trait ImageGenerator {
    /// Produce an image for a monster name.
    fn generate(&self, name: &str) -> impl Future<Output = Result<ImageRef, ImageError>> + Send;
}

/// Deterministic placeholder for a monster name: `{base}/{encoded name}/200`.
pub fn placeholder_image(base: &str, name: &str) -> ImageRef {
    ImageRef(format!("{}/{}/200", base.trim_end_matches('/'), encode_component(name)))
}

/// Percent-encode everything except the URI component unreserved set.
fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Display state of a monster's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus<'a> {
    Missing,
    Loading,
    Ready(&'a ImageRef),
}

/// A ticket for one outstanding image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    name: String,
    placeholder: ImageRef,
}

impl ImageRequest {
    /// The monster name being requested.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Await the generator. Errors fall back to the placeholder.
    pub async fn resolve<G: ImageGenerator>(self, generator: &G) -> ImageResolution {
        let image = match generator.generate(&self.name).await {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    monster = %self.name,
                    error = %err,
                    "image.generate_failed"
                );
                self.placeholder
            }
        };
        ImageResolution {
            name: self.name,
            image,
        }
    }
}

/// The outcome of a resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolution {
    pub name: String,
    pub image: ImageRef,
}

/// Name-keyed image cache with in-flight tracking.
#[derive(Debug, Clone)]
pub struct MonsterImageCache {
    images: HashMap<String, ImageRef>,
    pending: HashSet<String>,
    placeholder_base: String,
}

impl MonsterImageCache {
    pub fn new(placeholder_base: impl Into<String>) -> Self {
        Self {
            images: HashMap::new(),
            pending: HashSet::new(),
            placeholder_base: placeholder_base.into(),
        }
    }

    /// Start a request for `name`, unless one is cached or already in flight.
    pub fn begin(&mut self, name: &str) -> Option<ImageRequest> {
        if self.images.contains_key(name) || self.pending.contains(name) {
            return None;
        }
        self.pending.insert(name.to_string());
        tracing::debug!(target: LOG_TARGET, monster = %name, "image.requested");
        Some(ImageRequest {
            name: name.to_string(),
            placeholder: placeholder_image(&self.placeholder_base, name),
        })
    }

    /// Store a resolved image.
    pub fn finish(&mut self, resolution: ImageResolution) {
        self.pending.remove(&resolution.name);
        self.images.insert(resolution.name, resolution.image);
    }

    /// Forget an in-flight request whose ticket was dropped.
    pub fn abandon(&mut self, name: &str) {
        self.pending.remove(name);
    }

    pub fn status(&self, name: &str) -> ImageStatus<'_> {
        if let Some(image) = self.images.get(name) {
            ImageStatus::Ready(image)
        } else if self.pending.contains(name) {
            ImageStatus::Loading
        } else {
            ImageStatus::Missing
        }
    }

    pub fn get(&self, name: &str) -> Option<&ImageRef> {
        self.images.get(name)
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl Default for MonsterImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGenerator;

    impl ImageGenerator for FixedGenerator {
        async fn generate(&self, name: &str) -> Result<ImageRef, ImageError> {
            Ok(ImageRef(format!("https://images.test/{name}.png")))
        }
    }

    struct DownGenerator;

    impl ImageGenerator for DownGenerator {
        async fn generate(&self, _name: &str) -> Result<ImageRef, ImageError> {
            Err(ImageError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_placeholder_encoding() {
        let image = placeholder_image(DEFAULT_PLACEHOLDER_BASE, "Red Dragon");
        assert_eq!(image.as_str(), "https://picsum.photos/seed/Red%20Dragon/200");

        let image = placeholder_image("http://local/", "Ice/Queen");
        assert_eq!(image.as_str(), "http://local/Ice%2FQueen/200");
    }

    #[test]
    fn test_one_request_per_name() {
        let mut cache = MonsterImageCache::default();

        assert!(cache.begin("Spider").is_some());
        assert!(cache.begin("Spider").is_none());
        assert_eq!(cache.status("Spider"), ImageStatus::Loading);
        assert_eq!(cache.status("Goblin"), ImageStatus::Missing);
    }

    #[test]
    fn test_abandon_allows_retry() {
        let mut cache = MonsterImageCache::default();

        let _ = cache.begin("Spider");
        cache.abandon("Spider");

        assert_eq!(cache.status("Spider"), ImageStatus::Missing);
        assert!(cache.begin("Spider").is_some());
    }

    #[tokio::test]
    async fn test_resolve_with_generator() {
        let mut cache = MonsterImageCache::default();

        let request = cache.begin("Spider").unwrap();
        let resolution = request.resolve(&FixedGenerator).await;
        cache.finish(resolution);

        let expected = ImageRef("https://images.test/Spider.png".to_string());
        assert_eq!(cache.status("Spider"), ImageStatus::Ready(&expected));
        assert!(cache.begin("Spider").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_placeholder() {
        let mut cache = MonsterImageCache::default();

        let request = cache.begin("Ice Queen").unwrap();
        let resolution = request.resolve(&DownGenerator).await;
        assert_eq!(resolution.name, "Ice Queen");
        cache.finish(resolution);

        assert_eq!(
            cache.get("Ice Queen").map(ImageRef::as_str),
            Some("https://picsum.photos/seed/Ice%20Queen/200")
        );
    }
}
