use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(reqwest::Error),
    #[error("Usage API returned {status}: {message}")]
    Api {
        status: u16,
        message: String
    },
    #[error("Usage API rate limit exceeded: {message}")]
    RateLimited {
        message: String
    },
    #[error("Invalid API base URL [{0}]")]
    InvalidBaseUrl(String)
}

//NOTE: The request URL embeds the full account identifier, so it is stripped before the error can reach a log line or summary
impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.without_url())
    }
}
