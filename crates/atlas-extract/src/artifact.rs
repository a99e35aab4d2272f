use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::error::ExtractError;

/// Where an [`Artifact`]'s bytes live. Small JSON responses stay in memory;
/// zipped shapefiles spill to a [`tempfile::NamedTempFile`] so we never hold
/// a multi-hundred-megabyte TIGER archive in the process's heap. The temp
/// file is removed on drop regardless of how the artifact's scope exits.
enum Body {
    Memory(Vec<u8>),
    Disk(tempfile::NamedTempFile),
}

/// A downloaded, content-hashed response body (spec §3: "artifact" — the
/// extractor's unit of provenance). Constructing one always streams through
/// a SHA-256 hasher, so `content_hash` is never an afterthought bolted onto
/// an already-buffered `Vec<u8>`.
pub struct Artifact {
    body: Body,
    pub source_url: String,
    pub content_hash: String,
    pub http_status: u16,
    pub last_modified: Option<String>,
    pub fetched_at: chrono::DateTime<Utc>,
}

impl Artifact {
    pub fn bytes(&self) -> Result<Vec<u8>, ExtractError> {
        match &self.body {
            Body::Memory(b) => Ok(b.clone()),
            Body::Disk(f) => std::fs::read(f.path()).map_err(|e| ExtractError::MalformedArtifact(e.to_string())),
        }
    }

    /// Path to the artifact on disk, if it was downloaded in disk-backed
    /// mode. `shapefile_io` needs a real path to hand to the `zip` crate's
    /// seekable reader.
    pub fn path(&self) -> Option<&Path> {
        match &self.body {
            Body::Disk(f) => Some(f.path()),
            Body::Memory(_) => None,
        }
    }

    pub fn provenance_stub(&self) -> crate::feature::ProvenanceStub {
        crate::feature::ProvenanceStub {
            source_url: self.source_url.clone(),
            fetch_timestamp: self.fetched_at,
            content_hash: self.content_hash.clone(),
            http_status: Some(self.http_status),
            last_modified: self.last_modified.clone(),
        }
    }
}

/// GET `url` and materialize the body as an [`Artifact`], hashing as we
/// stream. `to_disk` selects disk-backed storage for large binary payloads
/// (shapefile zips) versus in-memory storage for JSON responses. Redirects
/// beyond 5 hops are treated as a permanent failure (spec §7: extractor
/// errors are either transient I/O or permanent I/O, never silently
/// followed forever).
pub fn download_artifact(client: &reqwest::blocking::Client, url: &str, to_disk: bool) -> Result<Artifact, ExtractError> {
    let mut resp = client.get(url).send()?;
    let status = resp.status();
    if status.as_u16() >= 300 && status.as_u16() < 400 {
        return Err(ExtractError::TooManyRedirects);
    }
    if !status.is_success() {
        return Err(ExtractError::HttpStatus(status.as_u16()));
    }

    let last_modified = resp
        .headers()
        .get(reqwest::header::LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0usize;

    let body = if to_disk {
        let mut file = tempfile::NamedTempFile::new().map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;
        loop {
            let n = resp.read(&mut buf).map_err(|e| ExtractError::Network(e.to_string()))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            file.write_all(&buf[..n]).map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;
            total += n;
        }
        file.flush().map_err(|e| ExtractError::MalformedArtifact(e.to_string()))?;
        Body::Disk(file)
    } else {
        let mut out = Vec::new();
        loop {
            let n = resp.read(&mut buf).map_err(|e| ExtractError::Network(e.to_string()))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            out.extend_from_slice(&buf[..n]);
            total += n;
        }
        Body::Memory(out)
    };

    if total == 0 {
        return Err(ExtractError::ParseEmpty);
    }

    Ok(Artifact {
        body,
        source_url: url.to_string(),
        content_hash: hex::encode(hasher.finalize()),
        http_status: status.as_u16(),
        last_modified,
        fetched_at: Utc::now(),
    })
}

/// Build a blocking client with a bounded redirect policy and a sane
/// connect/read timeout, matching the teacher's download path (no retry
/// logic here — that's `atlas_resilience::with_retry`'s job).
pub fn build_client(timeout: Duration) -> Result<reqwest::blocking::Client, ExtractError> {
    reqwest::blocking::Client::builder()
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(timeout)
        .user_agent("shadow-atlas/0.1")
        .build()
        .map_err(ExtractError::from)
}
