use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Reads local files and `http(s)://` or `file://` URLs. Downloads are
/// cached under `cache_dir`, named by the md5 of their URL.
#[derive(Debug, Clone)]
pub struct FileIo {
    base_dir: PathBuf,
    cache_dir: PathBuf,
}

impl FileIo {
    /// Relative paths are resolved against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn is_url(location: &str) -> bool {
        Url::parse(location).is_ok_and(|url| matches!(url.scheme(), "http" | "https" | "file"))
    }

    /// Local path of `location`, downloading it first when it is a remote URL
    pub fn resolve_file(&self, location: &str) -> Result<PathBuf> {
        if let Some(path) = file_url_path(location)? {
            return Ok(path);
        }
        if !Self::is_url(location) {
            let path = Path::new(location);
            return Ok(if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.base_dir.join(path)
            });
        }

        let cached = self.cache_path(location);
        if cached.is_file() {
            debug!("Using cached {} for {}", cached.display(), location);
            return Ok(cached);
        }
        let bytes = self
            .fetch(location)?
            .ok_or_else(|| Error::Resolution(format!("Unable to find {location}")))?;
        self.store(&cached, &bytes)?;
        Ok(cached)
    }

    pub fn read_to_string(&self, location: &str) -> Result<String> {
        let path = self.resolve_file(location)?;
        fs::read_to_string(&path)
            .map_err(|e| Error::Resolution(format!("Unable to read {}: {e}", path.display())))
    }

    /// Contents of `location`, `None` when it does not exist
    pub fn read_optional(&self, location: &str) -> Result<Option<String>> {
        if let Some(path) = file_url_path(location)? {
            return read_if_exists(&path);
        }
        if !Self::is_url(location) {
            return read_if_exists(&self.base_dir.join(location));
        }

        let cached = self.cache_path(location);
        if cached.is_file() {
            return read_if_exists(&cached);
        }
        match self.fetch(location)? {
            Some(bytes) => {
                self.store(&cached, &bytes)?;
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            None => Ok(None),
        }
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        let hash = format!("{:x}", md5::compute(url.as_bytes()));
        let name = url
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or("download");
        self.cache_dir.join(format!("{hash}-{name}"))
    }

    fn store(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Download `url`; `Ok(None)` on 404
    fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>> {
        info!("Downloading {}", url);
        let client = Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| Error::Resolution(format!("Unable to create HTTP client: {e}")))?;
        let response = client
            .get(url)
            .send()
            .map_err(|e| Error::Resolution(format!("Unable to retrieve {url}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::Resolution(format!(
                "Unable to retrieve {url}: HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| Error::Resolution(format!("Unable to read {url}: {e}")))?;
        Ok(Some(bytes.to_vec()))
    }
}

/// Path named by a `file:` URL, with percent-escapes decoded
fn file_url_path(location: &str) -> Result<Option<PathBuf>> {
    match Url::parse(location) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map(Some)
            .map_err(|()| Error::Resolution(format!("Invalid file URL {location}"))),
        _ => Ok(None),
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    if path.is_file() {
        Ok(Some(fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}
