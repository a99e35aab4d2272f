use std::collections::VecDeque;

use atlas_registry::SourceDescriptor;
use atlas_resilience::CancellationToken;
use regex::Regex;

use crate::artifact::{build_client, download_artifact};
use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::feature::RawFeature;
use crate::geojson::parse_feature_collection;
use crate::rate_limit::{host_of, HostRateLimiter};
use crate::shapefile_io::read_polygons_from_zip;

/// State-run GIS portals rarely share a common API; the fallback is a
/// shallow same-host crawl from a landing page looking for a direct
/// geodata download link. Depth is capped at 2 hops (spec §5: "bounded
/// crawl depth") and every request — landing pages and data files alike —
/// goes through the per-host rate gate.
#[derive(Default)]
pub struct CustomStateGisExtractor {
    limiter: std::sync::OnceLock<HostRateLimiter>,
}

const MAX_DEPTH: u32 = 2;

fn href_regex() -> Regex {
    Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).unwrap()
}

fn is_data_link(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.ends_with(".zip") || lower.ends_with(".geojson") || lower.ends_with(".json")
}

fn resolve(base: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        Some(href.to_string())
    } else if let Some(stripped) = href.strip_prefix('/') {
        let host_root = base.split("://").next().map(|scheme| format!("{scheme}://")).unwrap_or_default() + base.split("://").nth(1)?.split('/').next()?;
        Some(format!("{host_root}/{stripped}"))
    } else {
        None
    }
}

impl CustomStateGisExtractor {
    fn limiter(&self) -> &HostRateLimiter {
        self.limiter.get_or_init(HostRateLimiter::polite)
    }

    fn crawl(&self, client: &reqwest::blocking::Client, start_url: &str, token: &CancellationToken) -> Result<(String, bool), ExtractError> {
        let href_re = href_regex();
        let mut queue = VecDeque::new();
        queue.push_back((start_url.to_string(), 0u32));
        let mut visited = std::collections::HashSet::new();

        while let Some((url, depth)) = queue.pop_front() {
            token.check().map_err(|_| ExtractError::Cancelled)?;
            if !visited.insert(url.clone()) {
                continue;
            }
            if is_data_link(&url) {
                let is_shapefile = url.to_ascii_lowercase().ends_with(".zip");
                return Ok((url, is_shapefile));
            }
            if depth >= MAX_DEPTH {
                continue;
            }
            self.limiter().wait(&host_of(&url));
            let artifact = match download_artifact(client, &url, false) {
                Ok(a) => a,
                Err(_) => continue,
            };
            let body = artifact.bytes()?;
            let text = String::from_utf8_lossy(&body);
            for cap in href_re.captures_iter(&text) {
                if let Some(resolved) = resolve(&url, &cap[1]) {
                    queue.push_back((resolved, depth + 1));
                }
            }
        }
        Err(ExtractError::MalformedArtifact("crawl found no geodata link within depth bound".into()))
    }
}

impl Extractor for CustomStateGisExtractor {
    fn extract(&self, source: &SourceDescriptor, state_postal: &str, token: &CancellationToken) -> Result<Vec<RawFeature>, ExtractError> {
        token.check().map_err(|_| ExtractError::Cancelled)?;
        let client = build_client(std::time::Duration::from_secs(60))?;
        let landing_url = source.endpoint_for_state(state_postal);

        let (data_url, is_shapefile) = self.crawl(&client, &landing_url, token)?;

        token.check().map_err(|_| ExtractError::Cancelled)?;
        self.limiter().wait(&host_of(&data_url));
        let artifact = download_artifact(&client, &data_url, is_shapefile)?;

        if is_shapefile {
            let path = artifact.path().ok_or_else(|| ExtractError::MalformedArtifact("shapefile artifact missing disk path".into()))?;
            read_polygons_from_zip(path, artifact.provenance_stub())
        } else {
            parse_feature_collection(&artifact.bytes()?, &artifact.provenance_stub())
        }
    }
}
