use der::Encode;
use rsa::{
    RsaPrivateKey, RsaPublicKey,
    pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey},
    pkcs1v15::SigningKey as RsaSigningKey,
    signature::{SignatureEncoding, Signer as RsaSigner},
};
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::Result;

/// An RSA key pair used to self-sign the root certificate.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private: Box<RsaPrivateKey>,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    ///
    /// A single attempt, drawing from the operating system's CSPRNG.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)?;
        Ok(Self::from_private(private))
    }

    fn from_private(private: RsaPrivateKey) -> Self {
        let public = RsaPublicKey::from(&private);
        KeyPair {
            private: Box::new(private),
            public,
        }
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// The SubjectPublicKeyInfo embedded in certificates for this key.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        Ok(SubjectPublicKeyInfoOwned::from_key(self.public.clone())?)
    }

    /// DER encoding of [`KeyPair::as_spki`], used to compare keys.
    pub fn spki_der(&self) -> Result<Vec<u8>> {
        Ok(self.as_spki()?.to_der()?)
    }

    /// PKCS#1 `RSAPrivateKey` DER encoding of the private key.
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>> {
        let doc = self.private.to_pkcs1_der()?;
        Ok(doc.as_bytes().to_vec())
    }

    pub fn import_from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs1_der(der)?;
        Ok(Self::from_private(private))
    }

    /// Signs `data` with RSASSA-PKCS1-v1_5 over SHA-256.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signing_key: RsaSigningKey<Sha256> = RsaSigningKey::new((*self.private).clone());
        let signature = signing_key.try_sign(data)?;
        Ok(signature.to_vec())
    }
}
