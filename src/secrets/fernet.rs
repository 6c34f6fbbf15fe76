//! Fernet tokens (AES-128-CBC + HMAC-SHA256).
//!
//! Token layout before base64: `0x80 | timestamp(8) | iv(16) | ciphertext | hmac(32)`.
//! The 32-byte key splits into the signing key (first half) and the
//! encryption key (second half).

use std::time::{SystemTime, UNIX_EPOCH};

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{InvalidToken, SecretCipher, SecretsError};

type HmacSha256 = Hmac<Sha256>;
type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

const VERSION: u8 = 0x80;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const HMAC_LEN: usize = 32;
const HEADER_LEN: usize = 1 + 8 + IV_LEN;

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FernetCipher {
    signing_key: [u8; 16],
    encryption_key: [u8; 16],
}

impl FernetCipher {
    /// Build a cipher from a url-safe base64 key
    pub fn new(key: &str) -> Result<Self, SecretsError> {
        let mut raw = URL_SAFE.decode(key.trim()).map_err(|_| SecretsError::InvalidKey)?;
        if raw.len() != KEY_LEN {
            raw.zeroize();
            return Err(SecretsError::InvalidKey);
        }

        let mut cipher = Self {
            signing_key: [0; 16],
            encryption_key: [0; 16],
        };
        cipher.signing_key.copy_from_slice(&raw[..16]);
        cipher.encryption_key.copy_from_slice(&raw[16..]);
        raw.zeroize();
        Ok(cipher)
    }

    /// Fresh random key, url-safe base64 encoded
    pub fn generate_key() -> String {
        URL_SAFE.encode(rand::random::<[u8; KEY_LEN]>())
    }

    fn mac(&self) -> Result<HmacSha256, InvalidToken> {
        <HmacSha256 as Mac>::new_from_slice(&self.signing_key).map_err(|_| InvalidToken)
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, InvalidToken> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        self.encrypt_with(plaintext, timestamp, rand::random())
    }

    fn encrypt_with(&self, plaintext: &[u8], timestamp: u64, iv: [u8; IV_LEN]) -> Result<String, InvalidToken> {
        let ciphertext = Aes128CbcEnc::new(&self.encryption_key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut token = Vec::with_capacity(HEADER_LEN + ciphertext.len() + HMAC_LEN);
        token.push(VERSION);
        token.extend_from_slice(&timestamp.to_be_bytes());
        token.extend_from_slice(&iv);
        token.extend_from_slice(&ciphertext);

        let mut mac = self.mac()?;
        mac.update(&token);
        token.extend_from_slice(&mac.finalize().into_bytes());

        Ok(URL_SAFE.encode(token))
    }

    /// Verify and decrypt a token. Token age is not checked.
    pub fn decrypt_token(&self, token: &[u8]) -> Result<Vec<u8>, InvalidToken> {
        let data = URL_SAFE.decode(token).map_err(|_| InvalidToken)?;
        if data.len() < HEADER_LEN + HMAC_LEN || data[0] != VERSION {
            return Err(InvalidToken);
        }

        let (signed, tag) = data.split_at(data.len() - HMAC_LEN);
        let mut mac = self.mac()?;
        mac.update(signed);
        mac.verify_slice(tag).map_err(|_| InvalidToken)?;

        let iv = &signed[9..HEADER_LEN];
        let ciphertext = &signed[HEADER_LEN..];
        if ciphertext.is_empty() || ciphertext.len() % IV_LEN != 0 {
            return Err(InvalidToken);
        }

        Aes128CbcDec::new_from_slices(&self.encryption_key, iv)
            .map_err(|_| InvalidToken)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| InvalidToken)
    }
}

impl SecretCipher for FernetCipher {
    fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, InvalidToken> {
        self.decrypt_token(token)
    }
}
