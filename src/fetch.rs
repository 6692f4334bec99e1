//! Retrieval of the static data files.
//!
//! A [`Source`] is either a local path or an `http(s)` URL. URLs go through a
//! blocking HTTP client with timeouts and a short retry on server errors;
//! paths are read from disk.
//!
//! Multiple sources are fetched concurrently with [`Fetcher::fetch_all`]; the
//! caller receives every result only after all of them have resolved, so a
//! chart is never built from a partial set of files.
//!
//! ```no_run
//! # use tbviz::fetch::{Fetcher, Source};
//! let fetcher = Fetcher::default();
//! let [world, table] = fetcher.fetch_all([
//!     Source::parse("Data/World_Map.json"),
//!     Source::parse("Data/TB_Data.csv"),
//! ]);
//! let (world, table) = (world?, table?);
//! # Ok::<(), tbviz::VizError>(())
//! ```

use crate::error::{Result, VizError};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// `http://` and `https://` prefixes select a URL, everything else is a path.
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        if t.starts_with("http://") || t.starts_with("https://") {
            Source::Url(t.to_string())
        } else {
            Source::Path(PathBuf::from(t))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Url(u) => f.write_str(u),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    http: HttpClient,
    /// Relative paths are resolved against this directory.
    pub base_dir: Option<PathBuf>,
}

impl Default for Fetcher {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("tbviz/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("falling back to default http client: {e}");
                HttpClient::new()
            });
        Self {
            http,
            base_dir: None,
        }
    }
}

impl Fetcher {
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Read one source to a string.
    pub fn fetch_text(&self, source: &Source) -> Result<String> {
        match source {
            Source::Path(p) => {
                let path = match (&self.base_dir, p.is_relative()) {
                    (Some(base), true) => base.join(p),
                    _ => p.clone(),
                };
                log::debug!("reading {}", path.display());
                let bytes = std::fs::read(&path).map_err(|e| VizError::Fetch {
                    origin: path.display().to_string(),
                    message: e.to_string(),
                })?;
                Ok(decode_lossy(bytes, &path.display().to_string()))
            }
            Source::Url(u) => self.get_with_retry(u),
        }
    }

    /// Fetch every source in parallel and wait for all of them.
    pub fn fetch_all<const N: usize>(&self, sources: [Source; N]) -> [Result<String>; N] {
        std::thread::scope(|scope| {
            let handles = sources
                .each_ref()
                .map(|src| scope.spawn(move || self.fetch_text(src)));
            let mut i = 0;
            handles.map(|h| {
                let origin = sources[i].to_string();
                i += 1;
                h.join().unwrap_or_else(|_| {
                    Err(VizError::Fetch {
                        origin,
                        message: "loader thread panicked".into(),
                    })
                })
            })
        })
    }

    // Small retry for transient failures (5xx / network errors)
    fn get_with_retry(&self, url: &str) -> Result<String> {
        let mut last_err: Option<String> = None;
        for backoff_ms in [100u64, 300, 700] {
            log::debug!("GET {url}");
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => return Ok(r.text()?),
                Ok(r) if r.status().is_server_error() => {
                    last_err = Some(format!("HTTP {}", r.status()));
                }
                Ok(r) => {
                    return Err(VizError::Fetch {
                        origin: url.to_string(),
                        message: format!("request failed with HTTP {}", r.status()),
                    });
                }
                Err(e) => last_err = Some(e.to_string()),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        Err(VizError::Fetch {
            origin: url.to_string(),
            message: last_err.unwrap_or_else(|| "network error".into()),
        })
    }
}

// Invalid UTF-8 (Latin-1 exports) becomes U+FFFD instead of failing the file.
fn decode_lossy(bytes: Vec<u8>, origin: &str) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("{origin}: not valid UTF-8, replacing undecodable bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}
