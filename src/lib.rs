//! XTS-AES (IEEE P1619, NIST SP 800-38E) with ciphertext stealing,
//! plus a runner for NIST CAVS test vector files.
pub mod vectors;
pub mod xts;

pub use xts::{xts_encrypt, Block, BlockCipher, XtsAes, XtsContext, XtsError};
