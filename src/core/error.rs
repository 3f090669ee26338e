use reqwest::StatusCode;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised by catalog writes. Plain reads never fail; they degrade.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to save {target}: store responded {status}")]
    WriteRejected { target: String, status: StatusCode },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The current collection could not be read, so it cannot be modified.
    #[error("could not read current {collection}")]
    ReadFailed {
        collection: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to encode request body")]
    Encode(#[from] serde_json::Error),

    #[error("could not obtain an access token")]
    Credential(#[source] BoxError),

    #[error("invalid blob url: {0}")]
    InvalidUrl(String),

    #[error("no brand with id {0}")]
    UnknownBrand(String),
}

impl StoreError {
    pub(crate) fn transport(url: impl Into<String>, source: anyhow::Error) -> Self {
        StoreError::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    pub(crate) fn read_failed(collection: impl Into<String>, source: anyhow::Error) -> Self {
        StoreError::ReadFailed {
            collection: collection.into(),
            source: source.into(),
        }
    }

    pub(crate) fn credential(source: anyhow::Error) -> Self {
        StoreError::Credential(source.into())
    }
}
