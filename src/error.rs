//! use rootca::error::RootCaError;

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Represents errors that can occur while issuing the root CA.
///
/// The stage variants (`Config`, `KeyGenerationError`, `CertificateError`,
/// `KeyPairMismatch`, `WriteError`) carry the fixed message printed by the
/// binary. The pipeline stages keep the underlying cause as a string, shown
/// by `Debug` but not by `Display`. The remaining variants are raised by the
/// lower layers and get wrapped by the stage that hit them.
#[derive(Debug, Error)]
pub enum RootCaError {
    /// The command line failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Error during key generation.
    #[error("failed to generate CA private key")]
    KeyGenerationError(String),

    /// Error while building or signing the certificate.
    #[error("failed to create CA certificate")]
    CertificateError(String),

    /// The encoded certificate and private key do not form a pair.
    #[error("failed to create CA pem")]
    KeyPairMismatch(String),

    /// Error writing an output file.
    #[error("failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from RSA operations.
    #[error("RSA error: {0}")]
    RsaError(String),

    /// Error from RSA PKCS1 operations.
    #[error("RSA PKCS1 error: {0}")]
    RsaPkcs1Error(String),
}

pub type Result<T> = std::result::Result<T, RootCaError>;

impl From<der::Error> for RootCaError {
    /// Converts a `der::Error` into a `RootCaError`.
    fn from(err: der::Error) -> Self {
        RootCaError::DecodingError(err.to_string())
    }
}

impl From<x509_cert::spki::Error> for RootCaError {
    fn from(err: x509_cert::spki::Error) -> Self {
        RootCaError::EncodingError(err.to_string())
    }
}

impl From<rsa::Error> for RootCaError {
    fn from(err: rsa::Error) -> Self {
        RootCaError::RsaError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for RootCaError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        RootCaError::RsaPkcs1Error(err.to_string())
    }
}

impl From<rsa::signature::Error> for RootCaError {
    fn from(err: rsa::signature::Error) -> Self {
        RootCaError::RsaError(err.to_string())
    }
}

impl From<pem::PemError> for RootCaError {
    fn from(err: pem::PemError) -> Self {
        RootCaError::DecodingError(err.to_string())
    }
}

impl From<time::error::ComponentRange> for RootCaError {
    fn from(err: time::error::ComponentRange) -> Self {
        RootCaError::InvalidInput(err.to_string())
    }
}
