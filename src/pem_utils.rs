use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::Certificate;
use crate::error::{Result, RootCaError};

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";
pub const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM‑encoded string to DER‑encoded bytes.
pub fn pem_to_der(pem_str: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str)?;
    Ok(pem.contents().to_vec())
}

/// A certificate chain and the private key of its leaf, parsed from PEM.
#[derive(Debug, Clone)]
pub struct PemKeyPair {
    /// DER of every `CERTIFICATE` block, in file order; the first is the leaf.
    pub certificates: Vec<Vec<u8>>,
    pub private_key: RsaPrivateKey,
}

impl PemKeyPair {
    pub fn leaf_der(&self) -> &[u8] {
        &self.certificates[0]
    }
}

/// Parses a certificate PEM and a private key PEM and checks that they belong together.
///
/// All `CERTIFICATE` blocks of `cert_pem` are collected; the first
/// `RSA PRIVATE KEY` block of `key_pem` is decoded as PKCS#1. The leaf's
/// public key must be the one derived from the private key.
pub fn parse_key_pair(cert_pem: &str, key_pem: &str) -> Result<PemKeyPair> {
    let certificates: Vec<Vec<u8>> = pem::parse_many(cert_pem)?
        .into_iter()
        .filter(|block| block.tag() == CERTIFICATE_LABEL)
        .map(|block| block.into_contents())
        .collect();
    let Some(leaf_der) = certificates.first() else {
        return Err(RootCaError::KeyPairMismatch(
            "no CERTIFICATE block found in certificate input".to_string(),
        ));
    };

    let key_block = pem::parse_many(key_pem)?
        .into_iter()
        .find(|block| block.tag() == RSA_PRIVATE_KEY_LABEL)
        .ok_or_else(|| {
            RootCaError::KeyPairMismatch(
                "no RSA PRIVATE KEY block found in key input".to_string(),
            )
        })?;
    let private_key = RsaPrivateKey::from_pkcs1_der(key_block.contents())?;

    let leaf = Certificate::from_der(leaf_der)?;
    let derived = SubjectPublicKeyInfoOwned::from_key(private_key.to_public_key())?;
    if leaf.inner.tbs_certificate.subject_public_key_info != derived {
        return Err(RootCaError::KeyPairMismatch(
            "private key does not match certificate public key".to_string(),
        ));
    }

    Ok(PemKeyPair {
        certificates,
        private_key,
    })
}
