use der::Encode;
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::extensions::{BasicConstraints, ExtendedKeyUsage, SubjectKeyIdentifier};
use crate::cert::params::{CertificateDescriptor, DistinguishedName, ExtensionParam};
use crate::cert::sha256_with_rsa;
use crate::error::Result;
use crate::key::KeyPair;
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
///
/// This trait provides methods to retrieve issuer details and issue certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Signs `descriptor` and returns the resulting certificate.
    ///
    /// Extensions are emitted as key usage (critical), extended key usage,
    /// basic constraints (critical, only when `basic_constraints_valid`) and
    /// subject key identifier.
    fn issue(&self, descriptor: &CertificateDescriptor) -> Result<Certificate> {
        let mut extensions: Vec<ExtensionParam> = Vec::new();

        if !descriptor.key_usage.0.is_empty() {
            extensions.push(ExtensionParam::from_extension(descriptor.key_usage, true)?);
        }

        if !descriptor.extended_key_usage.is_empty() {
            let extended_key_usage = ExtendedKeyUsage {
                usage: descriptor.extended_key_usage.clone(),
            };
            extensions.push(ExtensionParam::from_extension(extended_key_usage, false)?);
        }

        if descriptor.basic_constraints_valid {
            let basic_constraints = BasicConstraints {
                is_ca: descriptor.is_ca,
                max_path_length: None,
            };
            extensions.push(ExtensionParam::from_extension(basic_constraints, true)?);
        }

        if descriptor.is_ca {
            let key_id = SubjectKeyIdentifier::from_spki(&descriptor.subject_public_key_info);
            extensions.push(ExtensionParam::from_extension(key_id, false)?);
        }

        let signature_algorithm = sha256_with_rsa();
        let tbs_cert = TbsCertificate {
            serial_number: descriptor.serial_number,
            signature_algorithm: signature_algorithm.clone(),
            issuer: self.issuer_name(),
            validity: descriptor.validity.clone(),
            subject: descriptor.subject.clone(),
            subject_public_key_info: descriptor.subject_public_key_info.clone(),
            extensions,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let signature = self.signing_key().sign_data(&tbs_cert_inner.to_der()?)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm,
            signature: der::asn1::BitString::from_bytes(&signature)?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}

/// Issues a certificate whose issuer is its own subject, signed by its own key.
pub struct SelfIssuer<'a> {
    pub name: DistinguishedName,
    pub key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }
}
