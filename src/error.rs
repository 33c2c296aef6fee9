use thiserror::Error;

use crate::event::Code;

#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Out of memory: failed to allocate {requested} bytes")]
    NoMemory { requested: usize },

    #[error("Misuse: {0}")]
    Misuse(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CommonError {
    /// Notifier code carried by the event reported for this error
    pub fn code(&self) -> Code {
        match self {
            CommonError::NoMemory { .. } => Code::NoMemory,
            CommonError::Misuse(_) => Code::Misuse,
            CommonError::Config(_) | CommonError::Serialization(_) => Code::Error,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_memory_display() {
        let err = CommonError::NoMemory { requested: 4096 };
        assert_eq!(
            err.to_string(),
            "Out of memory: failed to allocate 4096 bytes"
        );
        assert_eq!(err.code(), Code::NoMemory);
    }

    #[test]
    fn test_config_error_maps_to_generic_code() {
        let err = toml::from_str::<toml::Table>("debuggable = ").unwrap_err();
        let err = CommonError::from(err);
        assert!(matches!(err, CommonError::Config(_)));
        assert_eq!(err.code(), Code::Error);
    }
}
