use openssl::symm::Mode;

pub mod bitflip;
pub mod padding;

use crate::crypto::aes::ecb::{aes_128_ecb_raw, BLOCK_SIZE};
use crate::crypto::common::{pad_pkcs_7, strip_pad_pkcs_7};
use crate::crypto::xor::fixed_xor;
use crate::util::Error;

/// ct[i] = E(key, pt[i] XOR prev), prev = ct[i-1] or the IV for i = 0
pub fn aes_cbc_encrypt(buf: &[u8], key: &[u8; BLOCK_SIZE], iv: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>, Error> {
    let padded = pad_pkcs_7(buf, BLOCK_SIZE);
    let mut out: Vec<u8> = Vec::with_capacity(padded.len());
    let mut prev = iv.to_vec();
    for block in padded.chunks(BLOCK_SIZE) {
        let encrypted = aes_128_ecb_raw(Mode::Encrypt, key, &fixed_xor(block, &prev))?;
        prev = encrypted.clone();
        out.extend(encrypted);
    }
    Ok(out)
}

/// Decrypt without touching the padding. This is what a padding-validity
/// oracle inspects, and what the padding-oracle attack reconstructs
pub fn aes_cbc_decrypt_raw(buf: &[u8], key: &[u8; BLOCK_SIZE], iv: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>, Error> {
    if buf.is_empty() || buf.len() % BLOCK_SIZE != 0 {
        return Err(Error::LengthError { len: buf.len(), block_size: BLOCK_SIZE });
    }
    let raw = aes_128_ecb_raw(Mode::Decrypt, key, buf)?;
    let mut out: Vec<u8> = Vec::with_capacity(buf.len());
    let mut prev: &[u8] = iv;
    for (decrypted, ciphered) in raw.chunks(BLOCK_SIZE).zip(buf.chunks(BLOCK_SIZE)) {
        out.extend(fixed_xor(decrypted, prev));
        prev = ciphered;
    }
    Ok(out)
}

pub fn aes_cbc_decrypt(buf: &[u8], key: &[u8; BLOCK_SIZE], iv: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>, Error> {
    let padded = aes_cbc_decrypt_raw(buf, key, iv)?;
    strip_pad_pkcs_7(&padded, BLOCK_SIZE)
}

#[cfg(test)]
mod tests {
    use openssl::symm::Cipher;

    use super::*;
    use crate::crypto::common::generate_random_bytes;

    #[test]
    fn test_aes_cbc_round_trip() {
        let key: [u8; 16] = generate_random_bytes();
        let iv: [u8; 16] = generate_random_bytes();
        for len in [0, 1, 15, 16, 17, 100] {
            let plaintext: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let ciphertext = aes_cbc_encrypt(&plaintext, &key, &iv).unwrap();
            assert_eq!(0, ciphertext.len() % BLOCK_SIZE);
            assert_eq!(Ok(plaintext), aes_cbc_decrypt(&ciphertext, &key, &iv));
        }
    }

    #[test]
    fn test_aes_cbc_matches_openssl() {
        let key = b"YELLOW SUBMARINE";
        let iv = b"yellow submarine";
        let plaintext = b"Play that funky music, white boy";
        let ours = aes_cbc_encrypt(plaintext, key, iv).unwrap();
        let theirs = openssl::symm::encrypt(Cipher::aes_128_cbc(), key, Some(iv.as_slice()), plaintext).unwrap();
        assert_eq!(theirs, ours);
    }

    #[test]
    fn test_aes_cbc_decrypt_raw_keeps_padding() {
        let key: [u8; 16] = generate_random_bytes();
        let iv: [u8; 16] = generate_random_bytes();
        let plaintext = b"hello";
        let ciphertext = aes_cbc_encrypt(plaintext, &key, &iv).unwrap();
        let raw = aes_cbc_decrypt_raw(&ciphertext, &key, &iv).unwrap();
        assert_eq!(pad_pkcs_7(plaintext, BLOCK_SIZE), raw);
    }

    #[test]
    fn test_aes_cbc_decrypt_rejects_misaligned_ciphertext() {
        let key: [u8; 16] = generate_random_bytes();
        let iv: [u8; 16] = generate_random_bytes();
        assert_eq!(
            Err(Error::LengthError { len: 20, block_size: 16 }),
            aes_cbc_decrypt(&vec![0u8; 20], &key, &iv)
        );
    }
}
