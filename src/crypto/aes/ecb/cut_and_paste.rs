use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::crypto::aes::determine_block_size;
use crate::crypto::common::{pad_pkcs_7, repeating_block, round_up_to_nearest_multiple};
use crate::crypto::oracle::*;
use crate::util::{key_equals_val_encode, Error};

lazy_static! {
    // Canonical field order for encoded profiles. The encoder and the
    // cut-and-paste alignment arithmetic both rely on this exact order,
    // with `role` last
    static ref PROFILE_SCHEMA: Vec<Vec<u8>> = vec![
        b"email".to_vec(),
        b"uid".to_vec(),
        b"role".to_vec(),
    ];
}

#[derive(Debug, PartialEq)]
pub struct Profile {
    pub email: Vec<u8>,
    pub uid: Vec<u8>,
    pub role: Vec<u8>,
}

impl Profile {
    /// New profiles always get uid 10 and role `user`; the caller only
    /// controls the email. Metacharacters are eaten by the encoder
    pub fn from_email(buf: &[u8]) -> Profile {
        Profile {
            email: buf.to_vec(),
            uid: b"10".to_vec(),
            role: b"user".to_vec(),
        }
    }

    pub fn from_fields(fields: &HashMap<Vec<u8>, Vec<u8>>) -> Result<Profile, Error> {
        let get = |name: &[u8]| {
            fields.get(name)
                .cloned()
                .ok_or(Error::ParseError {})
        };
        Ok(Profile {
            email: get(b"email")?,
            uid: get(b"uid")?,
            role: get(b"role")?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let values = [&self.email, &self.uid, &self.role];
        let pairs: Vec<(Vec<u8>, Vec<u8>)> = PROFILE_SCHEMA.iter()
            .zip(values)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        key_equals_val_encode(&pairs)
    }
}

/// Forge an encrypted `role=admin` profile from an oracle that encodes and
/// ECB-encrypts a profile for any email we choose.
///
/// ECB encrypts blocks independently under one key, so blocks harvested
/// from different oracle calls can be spliced into a ciphertext that was
/// never produced whole: one call donates an isolated `admin ++ padding`
/// block, another is cut so its last block starts right after `role=`.
pub fn attack_ecb_cut_and_paste(encode_and_encrypt: &dyn Oracle) -> Result<Vec<u8>, Error> {
    let block_size = determine_block_size(&encode_and_encrypt);

    // An email of block_size - len("email=") bytes puts the next input byte
    // at the start of the second block. Feed the forged final plaintext
    // block there, twice, and harvest it via the repeat
    let left_padding_len = block_size - b"email=".len();
    let forged_block = pad_pkcs_7(b"admin", block_size);
    let payload = [
        vec![b'A'; left_padding_len],
        forged_block.clone(),
        forged_block,
    ].concat();
    let encrypted_payload = encode_and_encrypt(&payload);
    let (_, admin_ciphertext) = repeating_block(&encrypted_payload, block_size)
        .ok_or(Error::AttackFailure { position: 0 })?;

    // Now pick an email length that pushes the record's own role value into
    // a block of its own, i.e. `email=...&uid=10&role=` ends on a boundary
    let desired_user_prefix = b"evil123evil123evil123evil123000";
    let total_control_len = b"email=&uid=10&role=".len();
    let total_left_padding_len =
        round_up_to_nearest_multiple(total_control_len, block_size)
        - total_control_len;
    let user_buffer_length =
        total_left_padding_len
        + round_up_to_nearest_multiple(desired_user_prefix.len(), block_size)
        - desired_user_prefix.len();
    let payload_2 = [
        desired_user_prefix.to_vec(),
        vec![b'A'; user_buffer_length],
    ].concat();

    let encrypted_payload_2 = encode_and_encrypt(&payload_2);
    Ok([
        encrypted_payload_2[0..(encrypted_payload_2.len() - admin_ciphertext.len())]
            .to_vec(),
        admin_ciphertext,
    ].concat())
}
