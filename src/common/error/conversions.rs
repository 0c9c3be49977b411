//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert errors raised
//! by the container and temp-file layers into the unified Error type.

use super::types::Error;

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::ZipError(other.to_string()),
        }
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        // The temp file is dropped with the error and cleans itself up.
        Error::Io(err.error)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::Io(std::io::Error::other(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_io_error_keeps_io_variant() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = zip::result::ZipError::Io(io).into();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_zip_format_error_becomes_zip_variant() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::ZipError(_)));
    }
}
