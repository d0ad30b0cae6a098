pub mod extensions;
pub mod params;

use der::asn1::AnyRef;
use der::{Decode, DecodePem, Encode, EncodePem};
use extensions::{BasicConstraints, ExtendedKeyUsage, KeyUsage, ToAndFromX509Extension};
use params::{CertificateDescriptor, DistinguishedName, ExtensionParam, Validity};
use rsa::RsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha2::Sha256;
use x509_cert::certificate::CertificateInner;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::error::{Result, RootCaError};
use crate::issuer::{Issuer, SelfIssuer};
use crate::key::KeyPair;
use crate::tbs_certificate::{from_x509_time, serial_to_u64};

/// `sha256WithRSAEncryption` with the NULL parameters RFC 4055 requires.
pub fn sha256_with_rsa() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
        parameters: Some(AnyRef::NULL.into()),
    }
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode the certificate into DER or PEM formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Creates a new self-signed certificate: `descriptor.subject` is also the issuer.
    pub fn new_self_signed(descriptor: &CertificateDescriptor, key: &KeyPair) -> Result<Self> {
        let self_issuer = SelfIssuer {
            name: descriptor.subject.clone(),
            key,
        };
        self_issuer.issue(descriptor)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| RootCaError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format, LF line endings.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(der::pem::LineEnding::LF)
            .map_err(|e| RootCaError::EncodingError(e.to_string()))
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(Self {
            inner: CertificateInner::from_der(der)?,
        })
    }

    pub fn from_pem(pem: &str) -> Result<Self> {
        Ok(Self {
            inner: CertificateInner::from_pem(pem)?,
        })
    }

    /// The certificate's extensions, in encoding order.
    pub fn extensions(&self) -> Vec<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect()
    }

    fn find_extension<E: ToAndFromX509Extension>(&self) -> Result<Option<E>> {
        self.extensions()
            .iter()
            .find(|ext| ext.oid == E::OID)
            .map(|ext| ext.to_extension())
            .transpose()
    }

    /// Decodes the certificate back into the descriptor it was signed from.
    pub fn to_descriptor(&self) -> Result<CertificateDescriptor> {
        let tbs = &self.inner.tbs_certificate;

        let basic_constraints = self.find_extension::<BasicConstraints>()?;
        let key_usage = self.find_extension::<KeyUsage>()?.unwrap_or_default();
        let extended_key_usage = self
            .find_extension::<ExtendedKeyUsage>()?
            .unwrap_or_default()
            .usage;

        Ok(CertificateDescriptor {
            serial_number: serial_to_u64(&tbs.serial_number)?,
            subject: DistinguishedName::from_x509_name(&tbs.subject)?,
            validity: Validity {
                not_before: from_x509_time(&tbs.validity.not_before),
                not_after: from_x509_time(&tbs.validity.not_after),
            },
            subject_public_key_info: tbs.subject_public_key_info.clone(),
            key_usage,
            extended_key_usage,
            is_ca: basic_constraints.is_some_and(|bc| bc.is_ca),
            basic_constraints_valid: basic_constraints.is_some(),
        })
    }

    /// The issuer's distinguished name.
    pub fn issuer(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// Checks the certificate signature against `public_key`.
    pub fn verify_signature(&self, public_key: &RsaPublicKey) -> Result<()> {
        if self.inner.signature_algorithm.oid != const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION
        {
            return Err(RootCaError::InvalidInput(format!(
                "Unsupported signature algorithm {}",
                self.inner.signature_algorithm.oid
            )));
        }
        let tbs_der = self.inner.tbs_certificate.to_der()?;
        let signature = Signature::try_from(self.inner.signature.raw_bytes())?;
        let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
        verifying_key.verify(&tbs_der, &signature)?;
        Ok(())
    }
}
