//! Unified Error Model
//!
//! Only structural problems travel through `EsigError`. Validation
//! outcomes (revoked, expired, hash mismatch...) are `Conclusion`s.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EsigError {
    /// A required argument was empty or missing
    #[error("INPUT/{0}")]
    IllegalInput(String),

    /// The diagnostic data is not self-consistent
    #[error("FORMAT/{0}")]
    InputFormat(String),

    #[error("POLICY/{0}")]
    Policy(String),

    #[error("SERIALIZE/{0}")]
    Serialize(String),
}

impl EsigError {
    /// Dangling reference from one token to another
    pub fn dangling(owner: &str, kind: &str, id: &str) -> Self {
        EsigError::InputFormat(format!("{} references unknown {} '{}'", owner, kind, id))
    }
}

impl From<serde_json::Error> for EsigError {
    fn from(err: serde_json::Error) -> Self {
        EsigError::Serialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_prefixes() {
        assert_eq!(EsigError::IllegalInput("x".into()).to_string(), "INPUT/x");
        assert!(EsigError::dangling("signature S1", "certificate", "C9")
            .to_string()
            .starts_with("FORMAT/signature S1 references unknown certificate 'C9'"));
    }
}
