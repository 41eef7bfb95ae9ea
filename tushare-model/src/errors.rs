use std::fmt;

/// Error
///
/// `Validation`, `Http` and `Api` are the kinds defined by the
/// Tushare contract. The rest cover transport and decoding
/// failures that happen before a status or envelope is available.
#[derive(Debug)]
pub enum Error {
    /// caller options violate a parameter spec, raised before any request
    Validation(String),
    /// transport returned a non-success status
    Http { status: u16 },
    /// provider envelope reported a non-zero code
    Api { code: i64, msg: String },
    /// transport failed without a status
    Client(String),
    Json(serde_json::Error),
    /// columnar payload does not line up with its field list
    Decode(String),
}

impl Error {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Validation(ref s) => write!(f, "Validation error: {}", s),
            Error::Http { status } => write!(f, "HTTP error: status {}", status),
            Error::Api { code, ref msg } => write!(f, "Tushare API error {}: {}", code, msg),
            Error::Client(ref s) => write!(f, "Client error: {}", s),
            Error::Json(ref err) => write!(f, "Json error: {}", err),
            Error::Decode(ref s) => write!(f, "Decode error: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Json(ref err) => Some(err),
            Error::Validation(..) => None,
            Error::Http { .. } => None,
            Error::Api { .. } => None,
            Error::Client(..) => None,
            Error::Decode(..) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::Api {
            code: -1,
            msg: "invalid token".to_owned(),
        };
        assert_eq!("Tushare API error -1: invalid token", err.to_string());
        assert_eq!("HTTP error: status 502", Error::Http { status: 502 }.to_string());
        assert_eq!(
            "Validation error: ts_code is required",
            Error::validation("ts_code is required").to_string()
        );
    }
}
