use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Set all required env vars: ENVIRONMENT, FRONTEND_ROLLBAR_SERVER_ITEM_ACCESS_TOKEN.")]
    MissingConfig,

    #[error("Storage error on '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Staging error: {0}")]
    Staging(#[from] std::io::Error),

    #[error("Source map upload for '{key}' failed: {source}")]
    SourceMapUpload {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Source map upload for '{key}' rejected with status {status}: {body}")]
    SourceMapRejected {
        key: String,
        status: u16,
        body: String,
    },
}

impl ReleaseError {
    pub fn storage(key: impl Into<String>, source: anyhow::Error) -> Self {
        ReleaseError::Storage {
            key: key.into(),
            source,
        }
    }
}
