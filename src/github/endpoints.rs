// GitHub API endpoint functions.
// Typed methods for the contents API and the raw-content host.

use crate::error::Result;

use super::client::GitHubClient;
use super::types::ContentEntry;

impl GitHubClient {
    /// List the entries of a directory on a branch.
    pub async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Vec<ContentEntry>> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(path.split('/'));
        let url = self.api_url(segments);

        let params = [("ref", branch)];
        let response = self.get_with_params(url, &params).await?;
        parse_entries(&response.text().await?)
    }

    /// Fetch the raw text of a file on a branch.
    pub async fn get_raw_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<String> {
        let mut segments = vec![owner, repo, branch];
        segments.extend(path.split('/'));
        let url = self.raw_url(segments);

        let response = self.get(url).await?;
        let body = response.text().await?;
        Ok(body)
    }
}

/// Decode a contents API listing. A malformed body is a `Json` error.
fn parse_entries(body: &str) -> Result<Vec<ContentEntry>> {
    Ok(serde_json::from_str(body)?)
}
