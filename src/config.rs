use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Smallest key size, in bits, that is rejected. Valid sizes are strictly larger.
pub const MIN_KEY_SIZE: i64 = 1024;
/// Key sizes must be a multiple of this many bits.
pub const KEY_SIZE_STEP: i64 = 1024;
/// Smallest days-to-expire value that is rejected.
pub const MIN_DAYS_TO_EXPIRE: i64 = 90;

/// Command line flags, as parsed and before validation.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "rootca", version, about = "Issue a self-signed root certificate authority")]
pub struct Args {
    /// The path to output the CA certificate
    #[arg(long, default_value = "./")]
    pub output_path: PathBuf,
    /// The common name of the CA
    #[arg(long, default_value = "")]
    pub common_name: String,
    /// The organization of the CA
    #[arg(long, default_value = "")]
    pub organization: String,
    /// The organizational unit of the CA
    #[arg(long, default_value = "")]
    pub organizational_unit: String,
    /// The address of the CA
    #[arg(long, default_value = "")]
    pub address: String,
    /// The locality of the CA
    #[arg(long, default_value = "")]
    pub locality: String,
    /// The province of the CA
    #[arg(long, default_value = "")]
    pub province: String,
    /// The postal code of the CA
    #[arg(long, default_value = "")]
    pub postal_code: String,
    /// The country of the CA
    #[arg(long, default_value = "")]
    pub country: String,
    /// The key size of the CA
    #[arg(long, default_value_t = 2048, allow_negative_numbers = true)]
    pub key_size: i64,
    /// The number of days to expire the CA
    #[arg(long, default_value_t = 365, allow_negative_numbers = true)]
    pub days_to_expire: i64,
    /// Write each file to a temporary sibling and rename it into place
    #[arg(long)]
    pub atomic_write: bool,
}

/// A command line value that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ca-{0} is required")]
    MissingField(&'static str),

    #[error("ca-key-size must be greater than 1024")]
    KeySizeTooSmall(i64),

    #[error("ca-key-size must be a multiple of 1024")]
    KeySizeNotMultiple(i64),

    #[error("ca-days-to-expire must be greater than 90")]
    DaysToExpireTooSmall(i64),
}

/// How output files reach the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate and overwrite the target in place.
    #[default]
    Direct,
    /// Write a temporary file in the same directory, then rename it over the target.
    Atomic,
}

/// Validated configuration for issuing the root CA.
///
/// Only obtainable through [`CaConfig::try_from`], so every value satisfies
/// the field constraints checked there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaConfig {
    pub output_path: PathBuf,
    pub common_name: String,
    pub organization: String,
    pub organizational_unit: String,
    pub address: String,
    pub locality: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
    pub key_size: usize,
    /// Validated, but the certificate lifetime is fixed at ten years.
    pub days_to_expire: u32,
    pub write_mode: WriteMode,
}

impl TryFrom<Args> for CaConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let required = [
            ("common-name", &args.common_name),
            ("organization", &args.organization),
            ("organizational-unit", &args.organizational_unit),
            ("address", &args.address),
            ("locality", &args.locality),
            ("province", &args.province),
            ("postal-code", &args.postal_code),
            ("country", &args.country),
        ];
        if let Some((name, _)) = required.into_iter().find(|(_, value)| value.is_empty()) {
            return Err(ConfigError::MissingField(name));
        }

        if args.key_size <= MIN_KEY_SIZE {
            return Err(ConfigError::KeySizeTooSmall(args.key_size));
        }
        if args.key_size % KEY_SIZE_STEP != 0 {
            return Err(ConfigError::KeySizeNotMultiple(args.key_size));
        }
        let key_size = usize::try_from(args.key_size)
            .map_err(|_| ConfigError::KeySizeNotMultiple(args.key_size))?;

        if args.days_to_expire <= MIN_DAYS_TO_EXPIRE {
            return Err(ConfigError::DaysToExpireTooSmall(args.days_to_expire));
        }
        let days_to_expire = u32::try_from(args.days_to_expire)
            .map_err(|_| ConfigError::DaysToExpireTooSmall(args.days_to_expire))?;

        Ok(CaConfig {
            output_path: args.output_path,
            common_name: args.common_name,
            organization: args.organization,
            organizational_unit: args.organizational_unit,
            address: args.address,
            locality: args.locality,
            province: args.province,
            postal_code: args.postal_code,
            country: args.country,
            key_size,
            days_to_expire,
            write_mode: if args.atomic_write {
                WriteMode::Atomic
            } else {
                WriteMode::Direct
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_args() -> Vec<&'static str> {
        vec![
            "rootca",
            "--common-name=Test",
            "--organization=Org",
            "--organizational-unit=OU",
            "--address=1 St",
            "--locality=City",
            "--province=State",
            "--postal-code=00000",
            "--country=US",
        ]
    }

    fn parse(args: &[&str]) -> Result<CaConfig, ConfigError> {
        CaConfig::try_from(Args::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = parse(&valid_args()).unwrap();
        assert_eq!(config.output_path, PathBuf::from("./"));
        assert_eq!(config.key_size, 2048);
        assert_eq!(config.days_to_expire, 365);
        assert_eq!(config.write_mode, WriteMode::Direct);
        assert_eq!(config.address, "1 St");
    }

    #[test]
    fn test_each_required_field_is_named() {
        for field in [
            "common-name",
            "organization",
            "organizational-unit",
            "address",
            "locality",
            "province",
            "postal-code",
            "country",
        ] {
            let prefix = format!("--{field}=");
            let args: Vec<&str> = valid_args()
                .into_iter()
                .filter(|arg| !arg.starts_with(&prefix))
                .collect();
            let err = parse(&args).unwrap_err();
            assert_eq!(err, ConfigError::MissingField(field));
            assert_eq!(err.to_string(), format!("ca-{field} is required"));
        }
    }

    #[test]
    fn test_first_missing_field_wins() {
        let err = parse(&["rootca", "--country=US"]).unwrap_err();
        assert_eq!(err, ConfigError::MissingField("common-name"));
    }

    #[test]
    fn test_key_size_constraints() {
        for (size, expected) in [
            ("1024", ConfigError::KeySizeTooSmall(1024)),
            ("512", ConfigError::KeySizeTooSmall(512)),
            ("-2048", ConfigError::KeySizeTooSmall(-2048)),
            ("1500", ConfigError::KeySizeNotMultiple(1500)),
            ("3000", ConfigError::KeySizeNotMultiple(3000)),
        ] {
            let flag = format!("--key-size={size}");
            let mut args: Vec<&str> = valid_args();
            args.push(&flag);
            let err = parse(&args).unwrap_err();
            assert_eq!(err, expected);
            assert!(err.to_string().contains("key-size"));
        }

        let mut args: Vec<&str> = valid_args();
        args.push("--key-size=3072");
        assert_eq!(parse(&args).unwrap().key_size, 3072);
    }

    #[test]
    fn test_days_to_expire_constraint() {
        let mut args: Vec<&str> = valid_args();
        args.push("--days-to-expire=90");
        let err = parse(&args).unwrap_err();
        assert_eq!(err, ConfigError::DaysToExpireTooSmall(90));
        assert_eq!(err.to_string(), "ca-days-to-expire must be greater than 90");

        let mut args: Vec<&str> = valid_args();
        args.push("--days-to-expire=91");
        assert_eq!(parse(&args).unwrap().days_to_expire, 91);
    }

    #[test]
    fn test_atomic_write_flag() {
        let mut args: Vec<&str> = valid_args();
        args.push("--atomic-write");
        assert_eq!(parse(&args).unwrap().write_mode, WriteMode::Atomic);
    }
}
