//! GitHub source-location parsing.
//!
//! Accepted grammar: the first `github.com` that is immediately followed by
//! `/` or `:`, then a non-empty org segment, `/`, and a non-empty repo segment.
//! Segments stop at the next `/`, `?` or `#`. Text before `github.com`
//! (schemes, `url:`, `git@`) and after the repo segment (paths, `?ref=main`,
//! `#readme`) is ignored. The repo segment is otherwise taken verbatim, so
//! `repo.git` stays `repo.git`.

use once_cell::sync::Lazy;
use regex::Regex;

static GITHUB_SOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com[/:]([^/?#]+)/([^/?#]+)").expect("github source pattern compiles")
});

/// Repository coordinates parsed from a source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepo {
    /// Organization or user login.
    pub org: String,
    /// Repository name.
    pub repo: String,
}

impl GithubRepo {
    /// API path segments of a file at the repository root.
    pub fn contents_segments<'a>(&'a self, file: &'a str) -> [&'a str; 5] {
        ["repos", self.org.as_str(), self.repo.as_str(), "contents", file]
    }

    /// API path segments of the owning account.
    pub fn owner_segments(&self) -> [&str; 2] {
        ["users", self.org.as_str()]
    }
}

/// Parse a source location into GitHub coordinates.
///
/// Returns `None` for anything that is not a GitHub location; callers treat
/// that as "not applicable" rather than as a failure.
pub fn parse_github_source(location: &str) -> Option<GithubRepo> {
    let captures = GITHUB_SOURCE.captures(location)?;
    Some(GithubRepo {
        org: captures.get(1)?.as_str().to_string(),
        repo: captures.get(2)?.as_str().to_string(),
    })
}
