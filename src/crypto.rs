pub mod common;
pub mod xor;
pub mod oracle;
pub mod aes;
