use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram rejected the request ({status}): {description}")]
    Rejected {
        status: reqwest::StatusCode,
        description: String,
    },

    #[error("channel unavailable: {0}")]
    Unavailable(String),
}
