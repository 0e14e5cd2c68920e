use crate::error::CatError;
use async_graphql::{Error, ErrorExtensions};

impl ErrorExtensions for CatError {
    /// Carry `code` in the error extensions when the kind has one. Store
    /// faults are reported without detail; the cause is logged server-side.
    fn extend(&self) -> Error {
        let message = match self {
            CatError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        match self.code() {
            Some(code) => Error::new(message).extend_with(|_, e| e.set("code", code)),
            None => Error::new(message),
        }
    }
}
