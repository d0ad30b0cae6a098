use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{Any, PrintableStringRef, SetOfVec};
use der::{Tag, Tagged};
use time::{Duration, Month, OffsetDateTime};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use super::extensions::{ExtendedKeyUsageOption, KeyUsage, ToAndFromX509Extension};
use crate::config::CaConfig;
use crate::error::{Result, RootCaError};
use crate::key::KeyPair;

/// Attribute types carried in the subject, in encoding order.
pub const COUNTRY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
pub const PROVINCE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
pub const LOCALITY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
pub const STREET_ADDRESS: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.9");
pub const POSTAL_CODE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.17");
pub const ORGANIZATION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
pub const ORGANIZATIONAL_UNIT: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");
pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");

/// Lifetime of the root certificate in calendar years.
pub const VALIDITY_YEARS: i32 = 10;

/// Everything needed to sign the root certificate, before signing.
///
/// # Fields
/// * `serial_number` - The certificate serial number.
/// * `subject` - The distinguished name of the subject, which is also the issuer.
/// * `validity` - The `notBefore`/`notAfter` window.
/// * `subject_public_key_info` - The public key being certified.
/// * `key_usage` - Key usage flags.
/// * `extended_key_usage` - Extended key usage purposes.
/// * `is_ca` - The `cA` flag of the basic constraints.
/// * `basic_constraints_valid` - Whether the basic constraints extension is present.
#[derive(Clone, Debug, PartialEq)]
pub struct CertificateDescriptor {
    pub serial_number: u64,
    pub subject: DistinguishedName,
    pub validity: Validity,
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    pub key_usage: KeyUsage,
    pub extended_key_usage: Vec<ExtendedKeyUsageOption>,
    pub is_ca: bool,
    pub basic_constraints_valid: bool,
}

impl CertificateDescriptor {
    /// Assembles the root CA template for `key`, issued at `now`.
    ///
    /// The serial number is the year of `now`. The validity is always
    /// ten years; `config.days_to_expire` is not consulted.
    pub fn for_root_ca(config: &CaConfig, key: &KeyPair, now: OffsetDateTime) -> Result<Self> {
        let validity = Validity::ten_years_from(now)?;
        let serial_number = u64::try_from(validity.not_before.year()).map_err(|_| {
            RootCaError::InvalidInput(format!(
                "year {} cannot be used as a serial number",
                validity.not_before.year()
            ))
        })?;

        Ok(Self {
            serial_number,
            subject: DistinguishedName::from(config),
            validity,
            subject_public_key_info: key.as_spki()?,
            key_usage: KeyUsage::root_ca(),
            extended_key_usage: vec![
                ExtendedKeyUsageOption::ServerAuth,
                ExtendedKeyUsageOption::ClientAuth,
            ],
            is_ca: true,
            basic_constraints_valid: true,
        })
    }
}

/// Distinguished name parameters for building an X.509 certificate.
///
/// # Fields
/// * `common_name` - The common name (CN).
/// * `country` - The country (C).
/// * `province` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `street_address` - The street address (street).
/// * `postal_code` - The postal code (postalCode).
/// * `organization` - The organization (O).
/// * `organizational_unit` - The organizational unit (OU).
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: String,
    pub country: String,
    pub province: String,
    pub locality: String,
    pub street_address: String,
    pub postal_code: String,
    pub organization: String,
    pub organizational_unit: String,
}

impl From<&CaConfig> for DistinguishedName {
    fn from(config: &CaConfig) -> Self {
        DistinguishedName {
            common_name: config.common_name.clone(),
            country: config.country.clone(),
            province: config.province.clone(),
            locality: config.locality.clone(),
            street_address: config.address.clone(),
            postal_code: config.postal_code.clone(),
            organization: config.organization.clone(),
            organizational_unit: config.organizational_unit.clone(),
        }
    }
}

impl DistinguishedName {
    fn attributes(&self) -> [(ObjectIdentifier, &str); 8] {
        [
            (COUNTRY, self.country.as_str()),
            (PROVINCE, self.province.as_str()),
            (LOCALITY, self.locality.as_str()),
            (STREET_ADDRESS, self.street_address.as_str()),
            (POSTAL_CODE, self.postal_code.as_str()),
            (ORGANIZATION, self.organization.as_str()),
            (ORGANIZATIONAL_UNIT, self.organizational_unit.as_str()),
            (COMMON_NAME, self.common_name.as_str()),
        ]
    }

    /// Converts the distinguished name to an X.509-compatible format.
    ///
    /// Each non-empty attribute becomes its own single-valued RDN. Values
    /// are PrintableString when they fit that alphabet, UTF8String otherwise.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        let mut rdns = Vec::new();
        for (oid, value) in self.attributes() {
            if value.is_empty() {
                continue;
            }
            let tag = if PrintableStringRef::new(value).is_ok() {
                Tag::PrintableString
            } else {
                Tag::Utf8String
            };
            let attribute = AttributeTypeAndValue {
                oid,
                value: Any::new(tag, value.as_bytes())?,
            };
            rdns.push(RelativeDistinguishedName(SetOfVec::try_from(vec![
                attribute,
            ])?));
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    ///
    /// Attributes other than the eight carried here are ignored.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Result<Self> {
        let mut dn = DistinguishedName::default();
        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                if !matches!(attr.value.tag(), Tag::PrintableString | Tag::Utf8String) {
                    continue;
                }
                let value = std::str::from_utf8(attr.value.value())
                    .map_err(|e| RootCaError::DecodingError(e.to_string()))?
                    .to_string();
                let slot = match attr.oid {
                    COUNTRY => &mut dn.country,
                    PROVINCE => &mut dn.province,
                    LOCALITY => &mut dn.locality,
                    STREET_ADDRESS => &mut dn.street_address,
                    POSTAL_CODE => &mut dn.postal_code,
                    ORGANIZATION => &mut dn.organization,
                    ORGANIZATIONAL_UNIT => &mut dn.organizational_unit,
                    COMMON_NAME => &mut dn.common_name,
                    _ => continue,
                };
                *slot = value;
            }
        }
        Ok(dn)
    }
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period of exactly [`VALIDITY_YEARS`] calendar years from `now`.
    ///
    /// `now` is truncated to whole seconds, the resolution of the certificate
    /// time encodings. A start on February 29 ends on March 1 when the end
    /// year is not a leap year.
    pub fn ten_years_from(now: OffsetDateTime) -> Result<Self> {
        let not_before = now.replace_nanosecond(0)?;
        let end_year = not_before.year() + VALIDITY_YEARS;
        let not_after = if not_before.month() == Month::February && not_before.day() == 29 {
            match not_before.replace_year(end_year) {
                Ok(same_day) => same_day,
                Err(_) => not_before.replace_day(28)?.replace_year(end_year)? + Duration::days(1),
            }
        } else {
            not_before.replace_year(end_year)?
        };
        Ok(Self {
            not_before,
            not_after,
        })
    }
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Encodes `extension` into an `ExtensionParam`.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_ten_years_from() {
        let validity = Validity::ten_years_from(datetime!(2024-05-17 10:20:30.456 UTC)).unwrap();
        assert_eq!(validity.not_before, datetime!(2024-05-17 10:20:30 UTC));
        assert_eq!(validity.not_after, datetime!(2034-05-17 10:20:30 UTC));
    }

    #[test]
    fn test_ten_years_from_leap_day() {
        let validity = Validity::ten_years_from(datetime!(2024-02-29 00:00:00 UTC)).unwrap();
        assert_eq!(validity.not_after, datetime!(2034-03-01 00:00:00 UTC));

        let validity = Validity::ten_years_from(datetime!(2020-02-29 12:00:00 UTC)).unwrap();
        assert_eq!(validity.not_after, datetime!(2030-03-01 12:00:00 UTC));
    }

    #[test]
    fn test_x509_name_round_trip() {
        let dn = DistinguishedName::builder()
            .common_name("Test Root".to_string())
            .country("US".to_string())
            .province("State".to_string())
            .locality("City".to_string())
            .street_address("1 Main St, Suite 2".to_string())
            .postal_code("00000".to_string())
            .organization("Org & Sons".to_string())
            .organizational_unit("OU".to_string())
            .build();

        let x509 = dn.as_x509_name().unwrap();
        assert_eq!(x509.0.len(), 8);
        assert_eq!(x509.0[0].0.iter().next().unwrap().oid, COUNTRY);
        assert_eq!(x509.0[7].0.iter().next().unwrap().oid, COMMON_NAME);

        // '&' is outside the PrintableString alphabet.
        let organization = x509
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .find(|attr| attr.oid == ORGANIZATION)
            .unwrap();
        assert_eq!(organization.value.tag(), Tag::Utf8String);

        assert_eq!(DistinguishedName::from_x509_name(&x509).unwrap(), dn);
    }

    #[test]
    fn test_empty_attributes_are_skipped() {
        let dn = DistinguishedName {
            common_name: "only-cn".to_string(),
            ..Default::default()
        };
        let x509 = dn.as_x509_name().unwrap();
        assert_eq!(x509.0.len(), 1);
    }
}
