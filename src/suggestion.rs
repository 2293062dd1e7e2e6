//! Suggestion form: validation, the local suggestion log and the issue link.
//!
//! Accepted suggestions are kept locally (capped) for moderation and are
//! forwarded as a prefilled GitHub issue opened in the browser.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::catalog::Category;
use crate::storage::{keys, LocalStore, StoreError};
use crate::util::is_allowed_download_host;

/// Maximum number of stored suggestions; the oldest are evicted.
pub const MAX_SUGGESTIONS: usize = 100;

/// Label attached to the opened issue.
pub const ISSUE_LABEL: &str = "sugerencia";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("Please fill in the required field: {0}")]
    MissingField(&'static str),

    #[error("Please enter a valid URL: {0}")]
    InvalidUrl(String),

    #[error(
        "Only MediaFire, Google Drive, MEGA, Dropbox, GitHub, SourceForge, GitLab or direct HTTPS links are accepted (got {0})"
    )]
    DisallowedLink(String),

    #[error("Issue repository must look like owner/name (got \"{0}\")")]
    InvalidRepo(String),
}

// ============================================================================
// Form Fields
// ============================================================================

/// Raw form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionFields {
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
    pub link: String,
    pub website: String,
    pub email: String,
}

/// Validate the form and return the parsed download link.
///
/// # Errors
///
/// - `SuggestionError::MissingField` if name, description, category or link is blank
/// - `SuggestionError::InvalidUrl` if the link does not parse
/// - `SuggestionError::DisallowedLink` if the link is neither on a known
///   file host nor served over HTTPS
pub fn validate(fields: &SuggestionFields) -> Result<Url, SuggestionError> {
    if fields.name.trim().is_empty() {
        return Err(SuggestionError::MissingField("name"));
    }
    if fields.description.trim().is_empty() {
        return Err(SuggestionError::MissingField("description"));
    }
    if fields.category.is_none() {
        return Err(SuggestionError::MissingField("category"));
    }
    let link = fields.link.trim();
    if link.is_empty() {
        return Err(SuggestionError::MissingField("link"));
    }

    let url = Url::parse(link).map_err(|e| SuggestionError::InvalidUrl(e.to_string()))?;
    let host = url.host_str().unwrap_or_default();
    if url.scheme() != "https" && !is_allowed_download_host(host) {
        return Err(SuggestionError::DisallowedLink(
            if host.is_empty() { url.scheme() } else { host }.to_string(),
        ));
    }

    Ok(url)
}

// ============================================================================
// Suggestion Log
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub status: SuggestionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Locally stored suggestions, oldest first.
#[derive(Debug, Clone, Default)]
pub struct SuggestionLog {
    entries: Vec<Suggestion>,
}

impl SuggestionLog {
    pub async fn load(store: &LocalStore) -> Result<Self, StoreError> {
        let entries = store
            .get_json::<Vec<Suggestion>>(keys::SUGGESTIONS)
            .await?
            .unwrap_or_default();
        Ok(Self { entries })
    }

    pub async fn save(&self, store: &LocalStore) -> Result<(), StoreError> {
        store.set_json(keys::SUGGESTIONS, &self.entries).await
    }

    /// Validate `fields` and append a pending suggestion.
    ///
    /// Nothing is recorded when validation fails.
    pub fn submit(
        &mut self,
        fields: &SuggestionFields,
        now: DateTime<Utc>,
    ) -> Result<Suggestion, SuggestionError> {
        let suggestion = self.prepare(fields, now)?;
        self.record(suggestion.clone());
        Ok(suggestion)
    }

    /// Validate `fields` and build the pending suggestion without recording it.
    pub fn prepare(
        &self,
        fields: &SuggestionFields,
        now: DateTime<Utc>,
    ) -> Result<Suggestion, SuggestionError> {
        let url = validate(fields)?;
        let category = fields
            .category
            .ok_or(SuggestionError::MissingField("category"))?;

        let last_id = self.entries.iter().map(|s| s.id).max().unwrap_or(0);
        Ok(Suggestion {
            id: now.timestamp_millis().max(last_id + 1),
            name: fields.name.trim().to_string(),
            description: fields.description.trim().to_string(),
            category,
            link: url.to_string(),
            website: non_empty(&fields.website),
            email: non_empty(&fields.email),
            submitted_at: now,
            status: SuggestionStatus::Pending,
            reviewed_at: None,
        })
    }

    /// Append a prepared suggestion, evicting the oldest beyond the cap.
    pub fn record(&mut self, suggestion: Suggestion) {
        tracing::info!(id = suggestion.id, name = %suggestion.name, "Recorded suggestion");
        self.entries.push(suggestion);
        if self.entries.len() > MAX_SUGGESTIONS {
            let excess = self.entries.len() - MAX_SUGGESTIONS;
            self.entries.drain(..excess);
        }
    }

    /// Approve or reject a suggestion. Returns false if the id is unknown.
    pub fn set_status(&mut self, id: i64, status: SuggestionStatus, now: DateTime<Utc>) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        entry.status = status;
        entry.reviewed_at = match status {
            SuggestionStatus::Pending => None,
            _ => Some(now),
        };
        true
    }

    pub fn entries(&self) -> &[Suggestion] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Issue Link
// ============================================================================

/// Markdown body of the issue created for a suggestion.
pub fn issue_body(suggestion: &Suggestion) -> String {
    let mut body = String::from("## New suggestion for FoxWeb\n\n");
    body.push_str(&format!("**Name:** {}\n\n", suggestion.name));
    body.push_str(&format!("**Description:** {}\n\n", suggestion.description));
    body.push_str(&format!("**Category:** {}\n\n", suggestion.category.name()));
    body.push_str(&format!("**Download link:** {}\n\n", suggestion.link));
    if let Some(website) = &suggestion.website {
        body.push_str(&format!("**Official website:** {}\n\n", website));
    }
    if let Some(email) = &suggestion.email {
        body.push_str(&format!("**Contact email:** {}\n\n", email));
    }
    body.push_str(&format!(
        "**Submitted:** {}\n\n---\n*Sent from FoxWeb*\n",
        suggestion.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    body
}

/// True for `owner/name` made of ASCII letters, digits, `-`, `_` and `.`.
fn is_valid_repo(repo: &str) -> bool {
    let segment_ok = |s: &str| {
        !s.is_empty()
            && s != "."
            && s != ".."
            && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    matches!(repo.split_once('/'), Some((owner, name)) if segment_ok(owner) && segment_ok(name))
}

/// Prefilled "new issue" URL for `repo` (`owner/name`).
///
/// # Errors
///
/// - `SuggestionError::InvalidRepo` if `repo` is not `owner/name`
/// - `SuggestionError::InvalidUrl` if the URL cannot be assembled
pub fn issue_url(repo: &str, suggestion: &Suggestion) -> Result<Url, SuggestionError> {
    let repo = repo.trim().trim_matches('/');
    if !is_valid_repo(repo) {
        return Err(SuggestionError::InvalidRepo(repo.to_string()));
    }

    let title = format!("[SUGERENCIA] {}", suggestion.name);
    let body = issue_body(suggestion);
    Url::parse_with_params(
        &format!("https://github.com/{}/issues/new", repo),
        &[
            ("title", title.as_str()),
            ("body", body.as_str()),
            ("labels", ISSUE_LABEL),
        ],
    )
    .map_err(|e| SuggestionError::InvalidUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn fields(link: &str) -> SuggestionFields {
        SuggestionFields {
            name: "Krita".to_string(),
            description: "Painting program".to_string(),
            category: Some(Category::Programs),
            link: link.to_string(),
            website: "https://krita.org".to_string(),
            email: String::new(),
        }
    }

    #[test]
    fn test_missing_fields() {
        let mut f = fields("https://krita.org/dl");
        f.name = "  ".to_string();
        assert_eq!(validate(&f), Err(SuggestionError::MissingField("name")));

        let mut f = fields("https://krita.org/dl");
        f.category = None;
        assert_eq!(validate(&f), Err(SuggestionError::MissingField("category")));

        assert_eq!(validate(&fields("")), Err(SuggestionError::MissingField("link")));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            validate(&fields("not a url")),
            Err(SuggestionError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_allowed_links() {
        assert!(validate(&fields("https://example.com/file.zip")).is_ok());
        assert!(validate(&fields("http://www.mediafire.com/file/abc")).is_ok());
        assert!(validate(&fields("http://drive.google.com/x")).is_ok());
        assert_eq!(
            validate(&fields("http://example.com/file.zip")),
            Err(SuggestionError::DisallowedLink("example.com".to_string()))
        );
        // Lookalike hosts are not on the allow-list
        assert!(validate(&fields("http://evilgithub.com/x")).is_err());
    }

    #[test]
    fn test_mediafire_accepted_and_ftp_rejected() {
        let url = validate(&fields("https://mediafire.com/abc")).unwrap();
        assert_eq!(url.host_str(), Some("mediafire.com"));

        assert_eq!(
            validate(&fields("ftp://example.com/file")),
            Err(SuggestionError::DisallowedLink("example.com".to_string()))
        );
        let mut log = SuggestionLog::default();
        assert!(log.submit(&fields("ftp://example.com/file"), now()).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_submit_appends_pending() {
        let mut log = SuggestionLog::default();
        let suggestion = log.submit(&fields("https://krita.org/dl"), now()).unwrap();

        assert_eq!(log.len(), 1);
        assert_eq!(suggestion.status, SuggestionStatus::Pending);
        assert_eq!(suggestion.website.as_deref(), Some("https://krita.org"));
        assert_eq!(suggestion.email, None);
    }

    #[test]
    fn test_submit_invalid_records_nothing() {
        let mut log = SuggestionLog::default();
        assert!(log.submit(&fields("http://example.com"), now()).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_log_evicts_oldest_beyond_cap() {
        let mut log = SuggestionLog::default();
        let mut first_id = 0;
        for i in 0..=MAX_SUGGESTIONS {
            let s = log.submit(&fields("https://krita.org/dl"), now()).unwrap();
            if i == 0 {
                first_id = s.id;
            }
        }

        assert_eq!(log.len(), MAX_SUGGESTIONS);
        assert!(log.entries().iter().all(|s| s.id != first_id));
    }

    #[test]
    fn test_set_status_stamps_review_time() {
        let mut log = SuggestionLog::default();
        let s = log.submit(&fields("https://krita.org/dl"), now()).unwrap();

        assert!(log.set_status(s.id, SuggestionStatus::Approved, now()));
        assert_eq!(log.entries()[0].status, SuggestionStatus::Approved);
        assert_eq!(log.entries()[0].reviewed_at, Some(now()));
        assert!(!log.set_status(999, SuggestionStatus::Rejected, now()));
    }

    #[test]
    fn test_issue_url_encodes_title_body_and_label() {
        let mut log = SuggestionLog::default();
        let s = log.submit(&fields("https://krita.org/dl"), now()).unwrap();
        let url = issue_url("foxorange224/foxorange224.github.io", &s).unwrap();

        assert_eq!(url.host_str(), Some("github.com"));
        assert_eq!(url.path(), "/foxorange224/foxorange224.github.io/issues/new");

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["title"], "[SUGERENCIA] Krita");
        assert_eq!(pairs["labels"], "sugerencia");
        assert!(pairs["body"].contains("**Name:** Krita"));
        assert!(pairs["body"].contains("**Category:** Programs"));
        assert!(pairs["body"].contains("**Official website:** https://krita.org"));
        assert!(!pairs["body"].contains("Contact email"));
    }

    #[test]
    fn test_issue_url_rejects_malformed_repo() {
        let log = SuggestionLog::default();
        let s = log.prepare(&fields("https://krita.org/dl"), now()).unwrap();

        for repo in ["", "justaname", "owner/", "a/b/c", "owner/na me", "../x"] {
            assert!(
                matches!(issue_url(repo, &s), Err(SuggestionError::InvalidRepo(_))),
                "repo {:?} should be rejected",
                repo
            );
        }
        assert!(issue_url("/owner/repo.github.io/", &s).is_ok());
    }

    #[test]
    fn test_prepare_does_not_record() {
        let mut log = SuggestionLog::default();
        let s = log.prepare(&fields("https://krita.org/dl"), now()).unwrap();
        assert!(log.is_empty());

        log.record(s.clone());
        assert_eq!(log.entries(), &[s]);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = LocalStore::open(":memory:").await.unwrap();
        let mut log = SuggestionLog::default();
        log.submit(&fields("https://krita.org/dl"), now()).unwrap();
        log.save(&store).await.unwrap();
        assert!(store.get_item("foxweb_sugerencias").await.unwrap().is_some());

        let loaded = SuggestionLog::load(&store).await.unwrap();
        assert_eq!(loaded.entries(), log.entries());
    }
}
