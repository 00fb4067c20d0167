use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("no health checks found in log")]
    EmptyLog,

    #[error("unsupported sample count: {0} (expected 1 or 2)")]
    UnsupportedSampleCount(usize),

    #[error("cannot resolve tumor/reference roles: {0}")]
    ModeResolution(String),

    #[error("metric '{key}' missing for sample '{sample}'")]
    MissingKey { key: String, sample: String },

    #[error("metric '{key}' for sample '{sample}' is marked invalid upstream")]
    PoisonedValue { key: String, sample: String },

    #[error("metric '{key}' for sample '{sample}' is not usable: {detail}")]
    MalformedValue {
        key: String,
        sample: String,
        detail: String,
    },

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;
