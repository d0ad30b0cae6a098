use der::Encode;
use der::asn1::{GeneralizedTime, OctetString, UtcTime};
use time::OffsetDateTime;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::cert::params::{DistinguishedName, ExtensionParam, Validity};
use crate::error::{Result, RootCaError};

/// First year that must be encoded as GeneralizedTime (RFC 5280, 4.1.2.5).
const GENERALIZED_TIME_FROM_YEAR: i32 = 2050;

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
///
/// # Fields
/// * `serial_number` - The serial number, as a non-negative integer.
/// * `signature_algorithm` - The algorithm used to sign the certificate.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `validity` - The certificate's validity period.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key_info` - The public key of the certificate subject.
/// * `extensions` - X.509 extensions, in encoding order.
pub struct TbsCertificate {
    pub serial_number: u64,
    pub signature_algorithm: AlgorithmIdentifierOwned,
    pub issuer: DistinguishedName,
    pub validity: Validity,
    pub subject: DistinguishedName,
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.validity.not_before)?,
            not_after: to_x509_time(self.validity.not_after)?,
        };

        let serial_number = serial_from_u64(self.serial_number)?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: self.signature_algorithm.clone(),
            issuer: self.issuer.as_x509_name()?,
            validity,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.subject_public_key_info.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }

    /// Encodes the `TbsCertificate` into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_tbs_certificate_inner()?.to_der()?)
    }
}

/// UTCTime through 2049, GeneralizedTime from 2050 on.
pub fn to_x509_time(at: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let at = at.to_offset(time::UtcOffset::UTC);
    if at.year() < GENERALIZED_TIME_FROM_YEAR {
        Ok(x509_cert::time::Time::UtcTime(UtcTime::from_system_time(
            at.into(),
        )?))
    } else {
        Ok(x509_cert::time::Time::GeneralTime(
            GeneralizedTime::from_system_time(at.into())?,
        ))
    }
}

pub fn from_x509_time(at: &x509_cert::time::Time) -> OffsetDateTime {
    OffsetDateTime::from(at.to_system_time())
}

/// Encodes `value` as a serial number without leading zero octets.
pub fn serial_from_u64(value: u64) -> Result<SerialNumber> {
    let bytes = value.to_be_bytes();
    let first = bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(bytes.len() - 1);
    Ok(SerialNumber::new(&bytes[first..])?)
}

/// Big-endian serial number bytes as an integer.
pub fn serial_to_u64(serial: &SerialNumber) -> Result<u64> {
    let bytes = serial.as_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first..];
    if significant.len() > 8 {
        return Err(RootCaError::DecodingError(format!(
            "serial number of {} bytes does not fit in 64 bits",
            significant.len()
        )));
    }
    Ok(significant
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_time_encoding_switches_at_2050() {
        let before = to_x509_time(datetime!(2049-12-31 23:59:59 UTC)).unwrap();
        assert!(matches!(before, x509_cert::time::Time::UtcTime(_)));

        let after = to_x509_time(datetime!(2050-01-01 00:00:00 UTC)).unwrap();
        assert!(matches!(after, x509_cert::time::Time::GeneralTime(_)));

        assert_eq!(
            from_x509_time(&after),
            datetime!(2050-01-01 00:00:00 UTC)
        );
    }

    #[test]
    fn test_serial_number_of_year() {
        let serial = serial_from_u64(2026).unwrap();
        assert_eq!(serial_to_u64(&serial).unwrap(), 2026);
        assert_eq!(serial.to_der().unwrap(), vec![0x02, 0x02, 0x07, 0xea]);
    }
}
