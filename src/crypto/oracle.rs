use rand::Rng;

use crate::crypto::aes::cbc::aes_cbc_encrypt;
use crate::crypto::aes::ecb::aes_ecb_encrypt;
use crate::crypto::common::generate_random_bytes;

/// An encryption oracle: a black box the attacker may query with chosen
/// bytes, holding its session key (and any fixed affixes) behind the closure
pub trait Oracle: Fn(&[u8]) -> Vec<u8> {}
impl<T: Fn(&[u8]) -> Vec<u8>> Oracle for T {}

/// A padding-validity oracle: `(iv, ciphertext) -> bool`. It must be a pure
/// padding predicate; an oracle that conflates other decryption failures
/// with bad padding silently corrupts the attacks that consume it
pub trait ValidityOracle: Fn(&[u8], &[u8]) -> bool {}
impl<T: Fn(&[u8], &[u8]) -> bool> ValidityOracle for T {}

pub fn get_id_oracle() -> Box<dyn Oracle> {
    Box::new(move |buf: &[u8]| {
        buf.to_vec()
    })
}

pub fn choose_random<'a>(f: impl Oracle + 'a, g: impl Oracle + 'a) -> (bool, impl Oracle + 'a) {
    let mut rng = rand::thread_rng();
    let choose_f: bool = rng.gen();
    (choose_f, move |buf: &[u8]| {
        match choose_f {
            true  => f(buf),
            false => g(buf),
        }
    })
}

impl dyn Oracle {
    pub fn pullback_add_left_padding(self: Box<dyn Oracle>, lpad: &[u8]) -> Box<dyn Oracle> {
        let owned_lpad = lpad.to_owned();
        Box::new(move |buf: &[u8]| {
            let joined = [
                &owned_lpad,
                buf,
            ].concat();
            self(&joined)
        })
    }

    pub fn pullback_add_right_padding(self: Box<dyn Oracle>, rpad: &[u8]) -> Box<dyn Oracle> {
        let owned_rpad = rpad.to_owned();
        Box::new(move |buf: &[u8]| {
            let joined = [
                buf,
                &owned_rpad,
            ].concat();
            self(&joined)
        })
    }

    // The affix is drawn once, here, and fixed for the oracle's lifetime.
    // Attacks against these oracles rely on that determinism
    pub fn pullback_add_random_left_padding<const MIN: usize, const MAX: usize>(self: Box<dyn Oracle>) -> Box<dyn Oracle> {
        let mut rng = rand::thread_rng();
        let padding: [u8; MAX] = generate_random_bytes();
        let pad_len: usize = rng.gen_range(MIN..=MAX);
        self.pullback_add_left_padding(&padding[0..pad_len])
    }

    pub fn pullback_add_random_right_padding<const MIN: usize, const MAX: usize>(self: Box<dyn Oracle>) -> Box<dyn Oracle> {
        let mut rng = rand::thread_rng();
        let padding: [u8; MAX] = generate_random_bytes();
        let pad_len: usize = rng.gen_range(MIN..=MAX);
        self.pullback_add_right_padding(&padding[0..pad_len])
    }

    pub fn pushforward_ecb_encrypt_fixed_key(self: Box<dyn Oracle>) -> Box<dyn Oracle> {
        let key: [u8; 16] = generate_random_bytes();
        Box::new(move |buf: &[u8]| {
            let plaintext = self(buf);
            aes_ecb_encrypt(&plaintext, &key)
                .unwrap()
        })
    }

    pub fn pushforward_cbc_encrypt_fixed_key(self: Box<dyn Oracle>) -> Box<dyn Oracle> {
        let key: [u8; 16] = generate_random_bytes();
        let iv: [u8; 16] = generate_random_bytes();
        Box::new(move |buf: &[u8]| {
            let plaintext = self(buf);
            aes_cbc_encrypt(&plaintext, &key, &iv)
                .unwrap()
        })
    }
}

#[test]
fn test_oracle_affixes_are_fixed_per_session() {
    let oracle = get_id_oracle()
        .pullback_add_random_left_padding::<5, 10>()
        .pullback_add_random_right_padding::<5, 10>();
    assert_eq!(oracle(b"payload"), oracle(b"payload"));
}

#[test]
fn test_pushforward_ecb_is_deterministic() {
    let oracle = get_id_oracle().pushforward_ecb_encrypt_fixed_key();
    assert_eq!(oracle(b"some plaintext"), oracle(b"some plaintext"));
}
