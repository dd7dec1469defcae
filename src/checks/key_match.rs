//! Private key loading and certificate/key pairing
//!
//! Supports RSA, EC P-256/P-384/P-521 and Ed25519 keys in PKCS#8 (plain or
//! password-encrypted), PKCS#1 and SEC1 formats, PEM or DER. Traditional
//! OpenSSL PEM encryption (`Proc-Type: 4,ENCRYPTED`) is decrypted with the
//! supplied password.

use crate::certificate::info::Certificate;
use crate::utils::KeyError;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockCipher, BlockDecryptMut, KeyIvInit};
use md5::{Digest, Md5};
use pkcs8::der::Document;
use tracing::debug;

/// Public half of a loaded private key
#[derive(Debug, Clone)]
pub struct PrivateKeyInfo {
    /// SubjectPublicKeyInfo DER derived from the private key
    pub public_key_spki: Vec<u8>,
    /// Key type description, e.g. "EC P-256 (PKCS#8)"
    pub key_type: String,
}

/// Outcome of a pairing check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingOutcome {
    pub matched: bool,
    pub reason: String,
    pub key_type: String,
}

/// Decides whether a private key belongs to a certificate
pub trait KeyPairChecker {
    /// Load `key` (decrypting with `password` if needed) and compare it with
    /// `cert`. Unloadable keys are errors; a mismatch is an `Ok` outcome.
    fn check_pair(
        &self,
        cert: &Certificate,
        key: &[u8],
        password: Option<&str>,
    ) -> Result<PairingOutcome, KeyError>;
}

/// Pairs by comparing the certificate's SubjectPublicKeyInfo with the one
/// derived from the private key
#[derive(Debug, Clone, Copy, Default)]
pub struct SpkiKeyPairChecker;

impl KeyPairChecker for SpkiKeyPairChecker {
    fn check_pair(
        &self,
        cert: &Certificate,
        key: &[u8],
        password: Option<&str>,
    ) -> Result<PairingOutcome, KeyError> {
        let info = load_private_key(key, password)?;
        let matched = cert.public_key_der() == info.public_key_spki.as_slice();
        debug!(key_type = %info.key_type, matched, "Compared certificate and key");

        let reason = if matched {
            "Certificate and private key match".to_string()
        } else {
            format!(
                "The {} private key does not correspond to the certificate's public key",
                info.key_type
            )
        };

        Ok(PairingOutcome {
            matched,
            reason,
            key_type: info.key_type,
        })
    }
}

/// Parse a private key from PEM or DER bytes
pub fn load_private_key(data: &[u8], password: Option<&str>) -> Result<PrivateKeyInfo, KeyError> {
    if data.is_empty() {
        return Err(KeyError::parse("Private key input is empty"));
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if text.contains("-----BEGIN ") {
            return parse_pem_private_key(text, password);
        }
    }

    parse_der_private_key(data, password)
}

fn parse_pem_private_key(text: &str, password: Option<&str>) -> Result<PrivateKeyInfo, KeyError> {
    let pems = ::pem::parse_many(text.as_bytes())
        .map_err(|e| KeyError::parse(format!("Failed to parse PEM: {}", e)))?;

    for p in &pems {
        let legacy_encrypted = p
            .headers()
            .get("Proc-Type")
            .is_some_and(|v| v.contains("ENCRYPTED"));

        match p.tag() {
            "PRIVATE KEY" => return parse_pkcs8_der(p.contents()),
            "ENCRYPTED PRIVATE KEY" => return parse_encrypted_pkcs8_der(p.contents(), password),
            "RSA PRIVATE KEY" if legacy_encrypted => {
                let der = decrypt_legacy_pem(p, password)?;
                return parse_pkcs1_rsa(&der).map(mark_encrypted);
            }
            "EC PRIVATE KEY" if legacy_encrypted => {
                let der = decrypt_legacy_pem(p, password)?;
                return parse_sec1_ec(&der).map(mark_encrypted);
            }
            "RSA PRIVATE KEY" => return parse_pkcs1_rsa(p.contents()),
            "EC PRIVATE KEY" => return parse_sec1_ec(p.contents()),
            _ => continue,
        }
    }

    Err(KeyError::parse("No recognized private key block found"))
}

/// Try each DER container in turn
fn parse_der_private_key(data: &[u8], password: Option<&str>) -> Result<PrivateKeyInfo, KeyError> {
    if let Ok(info) = parse_pkcs8_der(data) {
        return Ok(info);
    }
    if let Ok(info) = parse_pkcs1_rsa(data) {
        return Ok(info);
    }
    if let Ok(info) = parse_sec1_ec(data) {
        return Ok(info);
    }
    if pkcs8::EncryptedPrivateKeyInfo::try_from(data).is_ok() {
        return parse_encrypted_pkcs8_der(data, password);
    }

    Err(KeyError::parse("Could not parse DER private key"))
}

fn parse_encrypted_pkcs8_der(der: &[u8], password: Option<&str>) -> Result<PrivateKeyInfo, KeyError> {
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(KeyError::PasswordRequired)?;

    let encrypted = pkcs8::EncryptedPrivateKeyInfo::try_from(der)
        .map_err(|e| KeyError::parse(format!("Malformed encrypted PKCS#8 key: {}", e)))?;
    let document = encrypted
        .decrypt(password)
        .map_err(|_| KeyError::parse("Failed to decrypt private key (wrong password?)"))?;

    parse_pkcs8_der(document.as_bytes()).map(mark_encrypted)
}

/// "EC P-256 (SEC1)" becomes "EC P-256 (encrypted SEC1)"
fn mark_encrypted(mut info: PrivateKeyInfo) -> PrivateKeyInfo {
    info.key_type = info.key_type.replacen('(', "(encrypted ", 1);
    info
}

fn parse_pkcs8_der(der: &[u8]) -> Result<PrivateKeyInfo, KeyError> {
    use pkcs8::DecodePrivateKey;

    if let Ok(rsa_key) = rsa::RsaPrivateKey::from_pkcs8_der(der) {
        return rsa_info(&rsa_key, "PKCS#8");
    }

    if let Ok(key) = p256::SecretKey::from_pkcs8_der(der) {
        use p256::pkcs8::EncodePublicKey;
        return encoded_public_key(key.public_key().to_public_key_der(), "EC P-256", "PKCS#8");
    }

    if let Ok(key) = p384::SecretKey::from_pkcs8_der(der) {
        use p384::pkcs8::EncodePublicKey;
        return encoded_public_key(key.public_key().to_public_key_der(), "EC P-384", "PKCS#8");
    }

    if let Ok(key) = p521::SecretKey::from_pkcs8_der(der) {
        use p521::pkcs8::EncodePublicKey;
        return encoded_public_key(key.public_key().to_public_key_der(), "EC P-521", "PKCS#8");
    }

    if let Ok(key) = ed25519_dalek::SigningKey::from_pkcs8_der(der) {
        use ed25519_dalek::pkcs8::EncodePublicKey;
        return encoded_public_key(key.verifying_key().to_public_key_der(), "Ed25519", "PKCS#8");
    }

    let info = pkcs8::PrivateKeyInfo::try_from(der)
        .map_err(|e| KeyError::parse(format!("Malformed PKCS#8 key: {}", e)))?;
    Err(KeyError::parse(format!(
        "Unsupported key algorithm {} in PKCS#8 container",
        info.algorithm.oid
    )))
}

fn parse_pkcs1_rsa(der: &[u8]) -> Result<PrivateKeyInfo, KeyError> {
    use rsa::pkcs1::DecodeRsaPrivateKey;

    let rsa_key = rsa::RsaPrivateKey::from_pkcs1_der(der)
        .map_err(|e| KeyError::parse(format!("Failed to parse PKCS#1 RSA key: {}", e)))?;
    rsa_info(&rsa_key, "PKCS#1")
}

fn rsa_info(key: &rsa::RsaPrivateKey, container: &str) -> Result<PrivateKeyInfo, KeyError> {
    use rsa::pkcs8::EncodePublicKey;
    encoded_public_key(rsa::RsaPublicKey::from(key).to_public_key_der(), "RSA", container)
}

fn parse_sec1_ec(der: &[u8]) -> Result<PrivateKeyInfo, KeyError> {
    if let Ok(key) = p256::SecretKey::from_sec1_der(der) {
        use p256::pkcs8::EncodePublicKey;
        return encoded_public_key(key.public_key().to_public_key_der(), "EC P-256", "SEC1");
    }

    if let Ok(key) = p384::SecretKey::from_sec1_der(der) {
        use p384::pkcs8::EncodePublicKey;
        return encoded_public_key(key.public_key().to_public_key_der(), "EC P-384", "SEC1");
    }

    if let Ok(key) = p521::SecretKey::from_sec1_der(der) {
        use p521::pkcs8::EncodePublicKey;
        return encoded_public_key(key.public_key().to_public_key_der(), "EC P-521", "SEC1");
    }

    Err(KeyError::parse(
        "Unsupported EC curve (only P-256, P-384 and P-521 are supported)",
    ))
}

fn encoded_public_key(
    spki: Result<Document, pkcs8::spki::Error>,
    algorithm: &str,
    container: &str,
) -> Result<PrivateKeyInfo, KeyError> {
    let spki = spki
        .map_err(|e| KeyError::parse(format!("Failed to encode {} public key: {}", algorithm, e)))?;

    Ok(PrivateKeyInfo {
        public_key_spki: spki.as_bytes().to_vec(),
        key_type: format!("{} ({})", algorithm, container),
    })
}

/// Ciphers OpenSSL writes into a `DEK-Info` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegacyCipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesEde3Cbc,
}

impl LegacyCipher {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "AES-128-CBC" => Some(Self::Aes128Cbc),
            "AES-192-CBC" => Some(Self::Aes192Cbc),
            "AES-256-CBC" => Some(Self::Aes256Cbc),
            "DES-EDE3-CBC" => Some(Self::DesEde3Cbc),
            _ => None,
        }
    }

    fn key_len(self) -> usize {
        match self {
            Self::Aes128Cbc => 16,
            Self::Aes192Cbc | Self::DesEde3Cbc => 24,
            Self::Aes256Cbc => 32,
        }
    }

    fn iv_len(self) -> usize {
        match self {
            Self::DesEde3Cbc => 8,
            _ => 16,
        }
    }

    fn decrypt(self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            Self::Aes128Cbc => cbc_decrypt::<aes::Aes128>(key, iv, data),
            Self::Aes192Cbc => cbc_decrypt::<aes::Aes192>(key, iv, data),
            Self::Aes256Cbc => cbc_decrypt::<aes::Aes256>(key, iv, data),
            Self::DesEde3Cbc => cbc_decrypt::<des::TdesEde3>(key, iv, data),
        }
    }
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, KeyError>
where
    C: BlockDecryptMut + BlockCipher,
    cbc::Decryptor<C>: KeyIvInit + BlockDecryptMut,
{
    cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| KeyError::parse("Invalid key or IV length for legacy PEM cipher"))?
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| KeyError::parse("Failed to decrypt private key (wrong password?)"))
}

/// Decrypt a traditional OpenSSL encrypted PEM body to its inner DER
fn decrypt_legacy_pem(block: &::pem::Pem, password: Option<&str>) -> Result<Vec<u8>, KeyError> {
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(KeyError::PasswordRequired)?;

    let dek_info = block
        .headers()
        .get("DEK-Info")
        .ok_or_else(|| KeyError::parse("Encrypted PEM key has no DEK-Info header"))?;
    let (name, iv_hex) = dek_info
        .split_once(',')
        .ok_or_else(|| KeyError::parse(format!("Malformed DEK-Info header: {}", dek_info)))?;

    let cipher = LegacyCipher::from_name(name.trim())
        .ok_or_else(|| KeyError::parse(format!("Unsupported PEM cipher {}", name.trim())))?;
    let iv = hex::decode(iv_hex.trim())
        .map_err(|e| KeyError::parse(format!("Malformed DEK-Info IV: {}", e)))?;
    if iv.len() != cipher.iv_len() {
        return Err(KeyError::parse(format!(
            "DEK-Info IV must be {} bytes, found {}",
            cipher.iv_len(),
            iv.len()
        )));
    }

    // The first eight IV bytes double as the key derivation salt
    let key = evp_bytes_to_key(password.as_bytes(), &iv[..8], cipher.key_len());
    cipher.decrypt(&key, &iv, block.contents())
}

/// OpenSSL `EVP_BytesToKey` with MD5 and a single iteration
fn evp_bytes_to_key(password: &[u8], salt: &[u8], key_len: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(key_len + 16);
    let mut block: Vec<u8> = Vec::new();

    while key.len() < key_len {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(password);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        key.extend_from_slice(&block);
    }

    key.truncate(key_len);
    key
}
