//! Upstream URL classification.
//!
//! # Responsibilities
//! - Recognize the fixed set of supported upstream URL shapes
//! - Extract owner (and repository/name) captures for access control
//! - Normalize the scheme for matching and fetching
//!
//! # Design Decisions
//! - Patterns see the candidate with its scheme stripped
//! - Every pattern is anchored at both ends, so an allowed host embedded in
//!   a path segment of another host never matches
//! - First match wins; the table order resolves overlapping host shapes

use once_cell::sync::Lazy;
use regex::Regex;

/// Which upstream shape a URL matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    GithubRelease,
    /// Viewer-style blob/raw path; blob paths are fetched as raw.
    GithubBlob,
    GithubGit,
    RawContent,
    Gist,
    Api,
    HuggingFace,
    HuggingFaceCdn,
    DockerDownload,
}

/// One entry of the ordered pattern table.
#[derive(Debug)]
pub struct UpstreamPattern {
    pub kind: UpstreamKind,
    regex: Regex,
}

impl UpstreamPattern {
    fn new(kind: UpstreamKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("upstream pattern must compile"),
        }
    }

    /// Captured groups on success; unmatched optional groups are omitted.
    pub fn captures(&self, candidate: &str) -> Option<Vec<String>> {
        self.regex.captures(candidate).map(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_string())
                .collect()
        })
    }
}

/// Patterns in priority order.
pub static UPSTREAM_PATTERNS: Lazy<Vec<UpstreamPattern>> = Lazy::new(|| {
    use UpstreamKind::*;
    vec![
        UpstreamPattern::new(
            GithubRelease,
            r"^github\.com/([^/]+)/([^/]+)/(?:releases|archive)/.*$",
        ),
        UpstreamPattern::new(
            GithubBlob,
            r"^github\.com/([^/]+)/([^/]+)/(?:blob|raw)/.*$",
        ),
        UpstreamPattern::new(
            GithubGit,
            r"^github\.com/([^/]+)/([^/]+)/(?:info|git-).*$",
        ),
        UpstreamPattern::new(
            RawContent,
            r"^raw\.github(?:usercontent|)\.com/([^/]+)/([^/]+)/.+?/.+$",
        ),
        UpstreamPattern::new(
            Gist,
            r"^gist\.github(?:usercontent|)\.com/([^/]+)/.+?/.+$",
        ),
        UpstreamPattern::new(
            Api,
            r"^api\.github\.com/repos/([^/]+)/([^/]+)/.*$",
        ),
        UpstreamPattern::new(
            HuggingFace,
            r"^huggingface\.co(?:/spaces)?/([^/]+)/(.+)$",
        ),
        UpstreamPattern::new(
            HuggingFaceCdn,
            r"^cdn-lfs\.hf\.co(?:/spaces)?/([^/]+)/([^/]+)(?:/(.*))?$",
        ),
        UpstreamPattern::new(
            DockerDownload,
            r"^download\.docker\.com/([^/]+)/.*\.(?:tgz|zip)$",
        ),
    ]
});

/// A successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamMatch {
    pub kind: UpstreamKind,
    pub captures: Vec<String>,
}

impl UpstreamMatch {
    /// The access-control key (owner or organization).
    pub fn identity(&self) -> Option<&str> {
        self.captures.first().map(String::as_str)
    }
}

/// Classify `candidate` against the pattern table. Any leading scheme is
/// ignored for matching.
pub fn match_upstream(candidate: &str) -> Option<UpstreamMatch> {
    let candidate = strip_scheme(candidate);
    UPSTREAM_PATTERNS.iter().find_map(|pattern| {
        pattern.captures(candidate).map(|captures| UpstreamMatch {
            kind: pattern.kind,
            captures,
        })
    })
}

/// Length of a leading `http://` or `https://`, compared case-insensitively.
fn scheme_len(candidate: &str) -> Option<usize> {
    ["https://", "http://"].iter().find_map(|scheme| {
        candidate
            .get(..scheme.len())
            .filter(|head| head.eq_ignore_ascii_case(scheme))
            .map(|_| scheme.len())
    })
}

/// Whether `candidate` starts with an explicit `http://` or `https://`.
pub fn has_scheme(candidate: &str) -> bool {
    scheme_len(candidate).is_some()
}

/// The candidate with any leading scheme removed.
pub fn strip_scheme(candidate: &str) -> &str {
    match scheme_len(candidate) {
        Some(len) => &candidate[len..],
        None => candidate,
    }
}

/// The candidate with `https://` forced when no scheme is present.
pub fn ensure_scheme(candidate: &str) -> String {
    if has_scheme(candidate) {
        candidate.to_string()
    } else {
        format!("https://{}", candidate)
    }
}

static BLOB_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(github\.com/[^/]+/[^/]+)/blob/").expect("blob pattern must compile")
});

/// Rewrite a viewer-style `github.com/{owner}/{repo}/blob/...` URL to its
/// `/raw/` equivalent.
///
/// Only the segment right after the repository is considered, so raw paths
/// and `blob` segments deeper in the path are left unchanged.
pub fn rewrite_blob(url: &str) -> String {
    let rest = strip_scheme(url);
    let scheme = &url[..url.len() - rest.len()];
    format!("{}{}", scheme, BLOB_SEGMENT.replace(rest, "$1/raw/"))
}
