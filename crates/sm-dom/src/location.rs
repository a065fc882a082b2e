//! Browsing location with a session-history list.

use sm_core::ScrollmarkError;
use sm_core::ScrollmarkResult;
use url::Url;

const BLANK_URL: &str = "about:blank";

/// Current URL plus the joint session history it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    entries: Vec<Url>,
    index: usize,
}

impl Location {
    pub fn new(url: &str) -> ScrollmarkResult<Self> {
        let parsed = Url::parse(url).map_err(|error| {
            ScrollmarkError::new(
                "dom.location.invalid_url",
                format!("cannot use `{url}` as a document location: {error}"),
            )
        })?;
        Ok(Self::from_url(parsed))
    }

    pub fn blank() -> Self {
        match Url::parse(BLANK_URL) {
            Ok(url) => Self::from_url(url),
            Err(_) => Self {
                entries: Vec::new(),
                index: 0,
            },
        }
    }

    fn from_url(url: Url) -> Self {
        Self {
            entries: vec![url],
            index: 0,
        }
    }

    pub fn url(&self) -> Option<&Url> {
        self.entries.get(self.index)
    }

    pub fn href(&self) -> &str {
        self.url().map(Url::as_str).unwrap_or(BLANK_URL)
    }

    /// Fragment without the leading `#`; `None` when the URL has none.
    pub fn fragment(&self) -> Option<&str> {
        self.url().and_then(Url::fragment)
    }

    /// `history.replaceState(null, "", "#<fragment>")`: swaps the current
    /// entry in place, history length is unchanged.
    pub fn replace_fragment(&mut self, fragment: &str) {
        let Some(current) = self.entries.get_mut(self.index) else {
            return;
        };
        current.set_fragment(Some(fragment));
    }

    /// `history.pushState(null, "", "#<fragment>")`: drops any forward
    /// entries and appends a new current entry.
    pub fn push_fragment(&mut self, fragment: &str) {
        let Some(mut next) = self.url().cloned() else {
            return;
        };
        next.set_fragment(Some(fragment));
        self.entries.truncate(self.index.saturating_add(1));
        self.entries.push(next);
        self.index = self.entries.len() - 1;
    }

    pub fn history_len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `false` when already at the first entry.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }
}
