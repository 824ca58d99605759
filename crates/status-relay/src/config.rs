//! Relay configuration
//!
//! `RelayConfig` is built once at the entry point and passed by reference into
//! every relay operation. Nothing in this crate reads the process environment.

use std::fmt;
use std::time::Duration;

use crate::error::RelayError;
use crate::Result;

/// Source pipeline platform API used when none is configured.
pub const DEFAULT_SOURCE_API: &str = "https://software.nersc.gov/api/v4";

/// Target status platform API used when none is configured.
pub const DEFAULT_TARGET_API: &str = "https://api.github.com";

/// Default number of pipeline lookups while the pipeline is running.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;

/// Default wait between two lookups of a running pipeline.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Bounded polling of a running pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of lookups, the first one included.
    pub max_attempts: u32,
    /// Sleep between two lookups.
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Look the pipeline up exactly once.
    pub fn no_wait() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_POLL_ATTEMPTS,
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        )
    }
}

/// Everything a single relay run needs to know.
#[derive(Clone)]
pub struct RelayConfig {
    /// Repository on the source pipeline platform (URL or `group/name`).
    pub source_repo: String,
    /// Repository on the target status platform (URL or `owner/repo`).
    pub target_repo: String,
    /// Accepted source branches, in priority order.
    pub branches: Vec<String>,
    /// Private token for the source platform.
    pub source_token: String,
    /// Token for the target platform.
    pub target_token: String,
    /// Status context label shown on the target platform.
    pub context: String,
    /// Commit to report on. Without it the first pipeline on an accepted branch is used.
    pub commit_sha: Option<String>,
    /// Source platform API base URL.
    pub source_api: String,
    /// Target platform API base URL.
    pub target_api: String,
    /// Polling of running pipelines.
    pub poll: PollPolicy,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("source_repo", &self.source_repo)
            .field("target_repo", &self.target_repo)
            .field("branches", &self.branches)
            .field("source_token", &"<redacted>")
            .field("target_token", &"<redacted>")
            .field("context", &self.context)
            .field("commit_sha", &self.commit_sha)
            .field("source_api", &self.source_api)
            .field("target_api", &self.target_api)
            .field("poll", &self.poll)
            .finish()
    }
}

impl RelayConfig {
    /// Check that every required setting is present and usable.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("source repository", &self.source_repo),
            ("target repository", &self.target_repo),
            ("source token", &self.source_token),
            ("target token", &self.target_token),
            ("status context", &self.context),
            ("source API", &self.source_api),
            ("target API", &self.target_api),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(RelayError::Config(format!("{name} is empty")));
            }
        }

        if self.branches.is_empty() {
            return Err(RelayError::Config("branch list is empty".to_string()));
        }

        if matches!(&self.commit_sha, Some(sha) if sha.trim().is_empty()) {
            return Err(RelayError::Config("commit sha is empty".to_string()));
        }

        project_search_term(&self.source_repo)?;
        RepoSlug::from_repo_url(&self.target_repo)?;
        Ok(())
    }

    /// Target repository as an `owner/repo` pair.
    pub fn target_slug(&self) -> Result<RepoSlug> {
        RepoSlug::from_repo_url(&self.target_repo)
    }
}

/// Split a comma separated branch list, dropping blanks.
pub fn parse_branch_list(raw: &str) -> Result<Vec<String>> {
    let branches: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();

    if branches.is_empty() {
        return Err(RelayError::Config(format!(
            "branch list '{raw}' contains no branch names"
        )));
    }
    Ok(branches)
}

/// Search term for a source repository: its last path segment without extension.
///
/// `https://gitlab.example.com/group/my-proj.git` searches for `my-proj`.
pub fn project_search_term(repo_url: &str) -> Result<String> {
    let segment = path_segments(repo_url).last().copied().ok_or_else(|| {
        RelayError::Config(format!("cannot derive a project from '{repo_url}'"))
    })?;

    let stem = match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    };
    Ok(stem.to_string())
}

fn path_segments(url: &str) -> Vec<&str> {
    url.trim()
        .trim_end_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// `owner/repo` identifier on the target platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    /// Take the last two path segments of a repository URL, dropping a `.git` suffix.
    ///
    /// scp-style remotes (`git@host:owner/repo.git`) are read from the path after
    /// the colon.
    pub fn from_repo_url(url: &str) -> Result<Self> {
        let segments = path_segments(repo_path(url));
        match segments.as_slice() {
            [.., owner, repo] if !owner.contains(|c: char| c == '@' || c == ':') => {
                let repo = repo.strip_suffix(".git").unwrap_or(*repo);
                if repo.is_empty() {
                    return Err(RelayError::Config(format!(
                        "cannot derive a repository from '{url}'"
                    )));
                }
                Ok(RepoSlug {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(RelayError::Config(format!(
                "expected an owner/repo path in '{url}'"
            ))),
        }
    }
}

fn repo_path(url: &str) -> &str {
    let url = url.trim();
    if url.contains("://") {
        return url;
    }
    url.split_once(':').map_or(url, |(_, path)| path)
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> RelayConfig {
        RelayConfig {
            source_repo: "https://gitlab.example.com/group/proj.git".to_string(),
            target_repo: "https://github.com/org/proj".to_string(),
            branches: vec!["main".to_string()],
            source_token: "glpat-secret".to_string(),
            target_token: "ghp-secret".to_string(),
            context: "nersc-ci".to_string(),
            commit_sha: Some("abc123".to_string()),
            source_api: DEFAULT_SOURCE_API.to_string(),
            target_api: DEFAULT_TARGET_API.to_string(),
            poll: PollPolicy::default(),
        }
    }

    #[test]
    fn test_poll_policy_default() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.interval, Duration::from_secs(10));
    }

    #[test]
    fn test_parse_branch_list() {
        let branches = parse_branch_list("main, develop,,release ").unwrap();
        assert_eq!(branches, vec!["main", "develop", "release"]);
    }

    #[test]
    fn test_parse_branch_list_rejects_blank() {
        let err = parse_branch_list(" , ").unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn test_project_search_term() {
        assert_eq!(
            project_search_term("https://gitlab.example.com/group/proj.git").unwrap(),
            "proj"
        );
        assert_eq!(project_search_term("org/proj").unwrap(), "proj");
        assert_eq!(project_search_term("org/proj/").unwrap(), "proj");
        assert_eq!(project_search_term("org/my.proj.git").unwrap(), "my.proj");
        assert!(project_search_term("  ").is_err());
    }

    #[test]
    fn test_repo_slug_from_url() {
        let slug = RepoSlug::from_repo_url("https://github.com/org/proj.git").unwrap();
        assert_eq!(slug.owner, "org");
        assert_eq!(slug.repo, "proj");
        assert_eq!(slug.to_string(), "org/proj");

        let slug = RepoSlug::from_repo_url("org/proj").unwrap();
        assert_eq!(slug.to_string(), "org/proj");
    }

    #[test]
    fn test_repo_slug_from_scp_style_remote() {
        let slug = RepoSlug::from_repo_url("git@github.com:org/proj.git").unwrap();
        assert_eq!(slug.owner, "org");
        assert_eq!(slug.repo, "proj");

        let slug = RepoSlug::from_repo_url("ssh://git@github.com/org/proj.git").unwrap();
        assert_eq!(slug.to_string(), "org/proj");
    }

    #[test]
    fn test_repo_slug_rejects_host_as_owner() {
        let err = RepoSlug::from_repo_url("git@github.com:proj.git").unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
        assert!(RepoSlug::from_repo_url("ssh://git@github.com/proj.git").is_err());
        assert!(RepoSlug::from_repo_url("https://user@github.com").is_err());
    }

    #[test]
    fn test_validate_rejects_unusable_target_repo() {
        let mut config = sample_config();
        config.target_repo = "git@github.com:proj".to_string();
        assert!(matches!(config.validate(), Err(RelayError::Config(_))));

        config.target_repo = "git@github.com:org/proj.git".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_slug().unwrap().to_string(), "org/proj");
    }

    #[test]
    fn test_repo_slug_needs_two_segments() {
        assert!(RepoSlug::from_repo_url("proj").is_err());
        assert!(RepoSlug::from_repo_url("https://github.com").is_err());
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_token() {
        let mut config = sample_config();
        config.target_token = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("target token"));
    }

    #[test]
    fn test_validate_rejects_empty_branches() {
        let mut config = sample_config();
        config.branches.clear();
        assert!(matches!(config.validate(), Err(RelayError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", sample_config());
        assert!(!rendered.contains("glpat-secret"));
        assert!(!rendered.contains("ghp-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
