//! # rootca - Issue a Self-Signed Root Certificate Authority
//!
//! rootca generates an RSA key pair, builds an X.509 v3 certificate carrying
//! the CA extensions, self-signs it and writes the result to disk. It is built
//! entirely with rustcrypto libraries, without ring or openssl.
//!
//! ## Output
//!
//! - **`ca.pem`**: the `CERTIFICATE` block, a blank line, then the PKCS#1
//!   `RSA PRIVATE KEY` block
//! - **`ca.crt`**: the certificate as raw DER
//!
//! ## Certificate Profile
//!
//! - Serial number: the current four-digit year
//! - Validity: ten calendar years from issuance
//! - Key usage: digital signature, certificate signing (critical)
//! - Extended key usage: server auth, client auth
//! - Basic constraints: `cA = true` (critical)
//! - Subject key identifier: SHA-1 of the public key
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clap::Parser;
//! use rootca::{config::{Args, CaConfig}, pki, writer};
//!
//! # fn main() -> Result<(), rootca::error::RootCaError> {
//! let args = Args::parse_from([
//!     "rootca",
//!     "--common-name=Example Root",
//!     "--organization=Example Corp",
//!     "--organizational-unit=PKI",
//!     "--address=1 Main St",
//!     "--locality=Springfield",
//!     "--province=State",
//!     "--postal-code=00000",
//!     "--country=US",
//! ]);
//! let config = CaConfig::try_from(args)?;
//!
//! let bundle = pki::generate_root_ca(&config)?;
//! writer::write_bundle(&config.output_path, &bundle, config.write_mode)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`config`]: Command line flags and their validation
//! - [`key`]: RSA key generation, PKCS#1 export and signing
//! - [`cert`]: Certificate descriptors, extensions, encoding and decoding
//! - [`issuer`]: Signing a descriptor into a certificate
//! - [`tbs_certificate`]: Low-level certificate structure manipulation
//! - [`pem_utils`]: PEM encoding and certificate/key pair validation
//! - [`pki`]: The issuance pipeline
//! - [`writer`]: Persisting `ca.pem` and `ca.crt`
//! - [`error`]: Error types

pub mod cert;
pub mod config;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod pki;
pub mod tbs_certificate;
pub mod writer;
