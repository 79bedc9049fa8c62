use std::path::PathBuf;

use crate::foundation::error::{MatteError, MatteResult};

/// Where a media URI is served from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UriKind {
    /// `http://` or `https://`, typically a development server.
    Http,
    /// `file://`, or a bare filesystem path.
    File,
    /// Any other scheme, e.g. a bundled-app origin.
    App,
}

/// A resolved media location, as handed to the compositor at mount time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaUri {
    raw: String,
    kind: UriKind,
}

impl MediaUri {
    /// Classify `raw`. Only empty input is rejected.
    pub fn parse(raw: impl Into<String>) -> MatteResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(MatteError::validation("media uri must not be empty"));
        }
        let kind = match scheme(&raw) {
            Some(s) if s.eq_ignore_ascii_case("http") || s.eq_ignore_ascii_case("https") => {
                UriKind::Http
            }
            Some(s) if s.eq_ignore_ascii_case("file") => UriKind::File,
            Some(_) => UriKind::App,
            None => UriKind::File,
        };
        Ok(Self { raw, kind })
    }

    /// The URI exactly as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Classification of the URI.
    pub fn kind(&self) -> UriKind {
        self.kind
    }

    /// Base reference a host document must be loaded under to be allowed to fetch this URI.
    ///
    /// For http(s) this is `scheme://authority` (no path); otherwise the containing directory,
    /// including the trailing `/`. Returns `None` when nothing can be derived.
    pub fn base_reference(&self) -> Option<String> {
        match self.kind {
            UriKind::Http => {
                let (scheme, rest) = self.raw.split_once("://")?;
                let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
                if end == 0 {
                    return None;
                }
                Some(format!("{scheme}://{}", &rest[..end]))
            }
            UriKind::File | UriKind::App => {
                let idx = self.raw.rfind('/')?;
                Some(self.raw[..=idx].to_string())
            }
        }
    }

    /// Filesystem path for `file://` URIs and bare paths.
    pub fn local_path(&self) -> Option<PathBuf> {
        if self.kind != UriKind::File {
            return None;
        }
        match scheme(&self.raw) {
            Some(_) => {
                let rest = &self.raw[self.raw.find(':')? + 1..];
                let rest = rest.strip_prefix("//").unwrap_or(rest);
                // `file://localhost/x` and `file:///x` both name `/x`.
                let path = match rest.find('/') {
                    Some(0) => rest,
                    Some(i) if rest[..i].eq_ignore_ascii_case("localhost") => &rest[i..],
                    _ => rest,
                };
                Some(PathBuf::from(path))
            }
            None => Some(PathBuf::from(&self.raw)),
        }
    }
}

impl std::fmt::Display for MediaUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// RFC 3986 scheme of `raw`, if it has one. Single letters are treated as drive letters.
fn scheme(raw: &str) -> Option<&str> {
    let (s, _) = raw.split_once(':')?;
    let mut chars = s.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() || s.len() < 2 {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(s)
}

#[cfg(test)]
#[path = "../../tests/unit/media/uri.rs"]
mod tests;
