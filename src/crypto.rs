//! # Request Encryption
//!
//! The comments endpoint only accepts bodies produced by the web client's
//! two-pass AES-128-CBC scheme:
//!
//! ```text
//! json ──AES(PRESET_KEY, IV)──▶ base64 ──AES(SECRET_KEY, IV)──▶ base64 = params
//!                                           SECRET_KEY ──RSA──▶ encSecKey
//! ```
//!
//! The second key is normally random per request and wrapped with the
//! service's RSA public key. Holding it fixed turns the RSA step into a
//! constant ([`ENC_SEC_KEY`]), so no big-integer arithmetic is needed and
//! the output is deterministic: identical requests always encrypt to
//! identical payloads.

use aes::Aes128;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use std::collections::BTreeMap;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;

/// First-pass key shared by every web client.
const PRESET_KEY: &[u8; 16] = b"0CoJUm6Qyw8W8jud";

/// IV used by both passes.
const IV: &[u8; 16] = b"0102030405060708";

/// Stands in for the per-request random key.
const SECRET_KEY: &[u8; 16] = b"4BfsFyBWTSe0C5eQ";

/// RSA encryption of the reversed [`SECRET_KEY`] under the service's public
/// key. Only valid while `SECRET_KEY` stays fixed.
pub const ENC_SEC_KEY: &str = "ac120b775a368f6cdf196f173ac16bccaa08e8589fdd824f7445cb71a6f12f7a25da019240ce2f69a214ef34ba2795b057b1cf4fd24fbf4bd9f78167c9c69de4ee8be3bb8bb9119e2a0328219497864558363bc8e5c8a7999822f127dc0d7fc3bbf0a53f3e2e091eba811eb57558dd6290ab4224f636cea2d264bb2ed7c7cee8";

/// Form fields ready to be posted to an encrypted endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRequest {
    pub params: String,
    pub enc_sec_key: String,
}

impl EncryptedRequest {
    /// The body as `(field, value)` pairs, using the service's field names.
    pub fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("params", self.params.clone()),
            ("encSecKey", self.enc_sec_key.clone()),
        ]
    }
}

fn aes_cbc_base64(plaintext: &[u8], key: &[u8; 16]) -> String {
    let ciphertext = Aes128CbcEnc::new(key.into(), IV.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    STANDARD.encode(ciphertext)
}

/// Encrypt a flat string-to-string request.
///
/// The fields are serialized as compact JSON in key order, so the output is
/// a pure function of the input.
pub fn encrypt_request(fields: &BTreeMap<String, String>) -> serde_json::Result<EncryptedRequest> {
    let text = serde_json::to_string(fields)?;
    let first = aes_cbc_base64(text.as_bytes(), PRESET_KEY);
    let params = aes_cbc_base64(first.as_bytes(), SECRET_KEY);

    Ok(EncryptedRequest {
        params,
        enc_sec_key: ENC_SEC_KEY.to_string(),
    })
}
