use log::{info, warn};
use time::OffsetDateTime;

use crate::cert::Certificate;
use crate::cert::params::{CertificateDescriptor, VALIDITY_YEARS};
use crate::config::CaConfig;
use crate::error::{Result, RootCaError};
use crate::key::KeyPair;
use crate::pem_utils::{CERTIFICATE_LABEL, RSA_PRIVATE_KEY_LABEL, der_to_pem, parse_key_pair};

/// The encoded root CA, checked and ready to be written.
#[derive(Debug, Clone)]
pub struct RootCaBundle {
    pub certificate: Certificate,
    /// `CERTIFICATE` PEM block.
    pub certificate_pem: String,
    /// `RSA PRIVATE KEY` PEM block holding the PKCS#1 key.
    pub private_key_pem: String,
    /// DER of the leaf certificate, taken from the re-parsed PEM pair.
    pub certificate_der: Vec<u8>,
}

impl RootCaBundle {
    /// Contents of `ca.pem`: the certificate block, a newline, the key block.
    pub fn combined_pem(&self) -> String {
        format!("{}\n{}", self.certificate_pem, self.private_key_pem)
    }
}

/// Generates the key and the self-signed root certificate for `config`, issued now.
pub fn generate_root_ca(config: &CaConfig) -> Result<RootCaBundle> {
    generate_root_ca_at(config, OffsetDateTime::now_utc())
}

/// Like [`generate_root_ca`], with the issuance instant supplied by the caller.
pub fn generate_root_ca_at(config: &CaConfig, now: OffsetDateTime) -> Result<RootCaBundle> {
    info!("generating {}-bit RSA key", config.key_size);
    let key = KeyPair::generate_rsa(config.key_size)
        .map_err(|e| RootCaError::KeyGenerationError(e.to_string()))?;

    let certificate = build_certificate(config, &key, now)
        .map_err(|e| RootCaError::CertificateError(e.to_string()))?;

    let certificate_der = certificate
        .to_der()
        .map_err(|e| RootCaError::CertificateError(e.to_string()))?;
    let certificate_pem = der_to_pem(&certificate_der, CERTIFICATE_LABEL);
    let private_key_der = key
        .to_pkcs1_der()
        .map_err(|e| RootCaError::CertificateError(e.to_string()))?;
    let private_key_pem = der_to_pem(&private_key_der, RSA_PRIVATE_KEY_LABEL);

    let pair = parse_key_pair(&certificate_pem, &private_key_pem).map_err(|e| match e {
        RootCaError::KeyPairMismatch(_) => e,
        other => RootCaError::KeyPairMismatch(other.to_string()),
    })?;
    info!("certificate and private key verified as a pair");

    Ok(RootCaBundle {
        certificate,
        certificate_pem,
        private_key_pem,
        certificate_der: pair.leaf_der().to_vec(),
    })
}

fn build_certificate(config: &CaConfig, key: &KeyPair, now: OffsetDateTime) -> Result<Certificate> {
    let descriptor = CertificateDescriptor::for_root_ca(config, key, now)?;
    let validity_days = (descriptor.validity.not_after - descriptor.validity.not_before).whole_days();
    if validity_days != i64::from(config.days_to_expire) {
        warn!(
            "days-to-expire={} is not applied; the certificate is valid for {VALIDITY_YEARS} years ({validity_days} days)",
            config.days_to_expire
        );
    }
    info!(
        "signing root certificate for CN={} serial={} valid {:?} to {:?}",
        descriptor.subject.common_name,
        descriptor.serial_number,
        descriptor.validity.not_before,
        descriptor.validity.not_after
    );
    Certificate::new_self_signed(&descriptor, key)
}
