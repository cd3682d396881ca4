use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("GraphQL errors: {0}")]
    Graphql(String),

    #[error("could not decode response JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("response carried no data payload")]
    MissingData,

    #[error("could not read climbs file {}: {}", .path.display(), .source)]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// True for the failure modes the region walk treats as "response too
    /// big, split into children": request timeouts and upstream 502/504.
    pub fn is_split_signal(&self) -> bool {
        match self {
            ClientError::Transport { source, .. } => source.is_timeout(),
            ClientError::Status { status, .. } => {
                *status == StatusCode::BAD_GATEWAY || *status == StatusCode::GATEWAY_TIMEOUT
            }
            _ => false,
        }
    }
}

/// Trim a response body quoted in an error to a readable length.
pub(crate) fn body_excerpt(body: &str) -> String {
    const MAX_CHARS: usize = 500;
    if body.chars().count() <= MAX_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_CHARS).collect();
        format!("{cut}...")
    }
}
