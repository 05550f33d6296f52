use openssl::symm::{Cipher, Crypter, Mode};

pub mod byte_by_byte;
pub mod cut_and_paste;

use crate::crypto::common::{pad_pkcs_7, strip_pad_pkcs_7};
use crate::util::Error;

pub const BLOCK_SIZE: usize = 16;

// The opaque block cipher primitive: raw AES-128-ECB over already-aligned
// data, no padding on either side. Every mode in this crate is built on it
pub(crate) fn aes_128_ecb_raw(mode: Mode, key: &[u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>, Error> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::LengthError { len: data.len(), block_size: BLOCK_SIZE });
    }
    let mut crypter = Crypter::new(Cipher::aes_128_ecb(), mode, key, None)
        .map_err(|_| Error::CipherError {})?;
    crypter.pad(false);
    let mut out = vec![0u8; data.len() + BLOCK_SIZE];
    let mut n = crypter.update(data, &mut out)
        .map_err(|_| Error::CipherError {})?;
    n += crypter.finalize(&mut out[n..])
        .map_err(|_| Error::CipherError {})?;
    out.truncate(n);
    Ok(out)
}

pub fn aes_ecb_encrypt(buf: &[u8], key: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>, Error> {
    let padded = pad_pkcs_7(buf, BLOCK_SIZE);
    aes_128_ecb_raw(Mode::Encrypt, key, &padded)
}

/// Decrypt and strip padding. Invalid padding is surfaced as `PaddingError`,
/// never truncated away; several attacks depend on observing that failure
pub fn aes_ecb_decrypt(buf: &[u8], key: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>, Error> {
    let padded = aes_128_ecb_raw(Mode::Decrypt, key, buf)?;
    strip_pad_pkcs_7(&padded, BLOCK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::common::generate_random_bytes;

    #[test]
    fn test_aes_ecb_round_trip() {
        let key: [u8; 16] = generate_random_bytes();
        for len in [0, 1, 15, 16, 17, 48] {
            let plaintext = vec![b'x'; len];
            let ciphertext = aes_ecb_encrypt(&plaintext, &key).unwrap();
            assert_eq!(0, ciphertext.len() % BLOCK_SIZE);
            assert_eq!(Ok(plaintext), aes_ecb_decrypt(&ciphertext, &key));
        }
    }

    #[test]
    fn test_aes_ecb_matches_openssl() {
        let key = b"YELLOW SUBMARINE";
        let plaintext = b"I'm back and I'm ringin' the bell";
        let ours = aes_ecb_encrypt(plaintext, key).unwrap();
        let theirs = openssl::symm::encrypt(Cipher::aes_128_ecb(), key, None, plaintext).unwrap();
        assert_eq!(theirs, ours);
    }

    #[test]
    fn test_aes_ecb_decrypt_rejects_misaligned_ciphertext() {
        let key: [u8; 16] = generate_random_bytes();
        assert_eq!(
            Err(Error::LengthError { len: 17, block_size: 16 }),
            aes_ecb_decrypt(&vec![0u8; 17], &key)
        );
    }

    #[test]
    fn test_aes_ecb_decrypt_rejects_invalid_padding() {
        let key: [u8; 16] = generate_random_bytes();
        let bad = [b"ICE ICE BABY".as_slice(), &[0x05, 0x05, 0x05, 0x05]].concat();
        let ciphertext = aes_128_ecb_raw(Mode::Encrypt, &key, &bad).unwrap();
        assert_eq!(Err(Error::PaddingError {}), aes_ecb_decrypt(&ciphertext, &key));
    }
}
