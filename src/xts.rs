use aes::{Aes128, Aes192, Aes256};
use thiserror::Error;
use tracing::debug;

pub mod cipher;
pub mod encrypt;
pub mod tweak;

pub use cipher::BlockCipher;
pub use encrypt::{xts_encrypt, DataUnit, XtsContext};
pub use tweak::{gf128_mul_x, Tweak};

/// Always 128 bits by definition
pub const AES_BLOCK_SIZE: usize = 16;

/// Alias for a block-sized byte array
pub type Block = [u8; AES_BLOCK_SIZE];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum XtsError {
    #[error("A data unit of {len} bytes is invalid (must be 16 bytes to 2^20 blocks long)")]
    InvalidInputLength { len: usize },
    #[error("The output buffer holds {actual} bytes, but {expected} are required")]
    OutputTooSmall { expected: usize, actual: usize },
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(&'static str),
}

pub type Result<T> = std::result::Result<T, XtsError>;

/// XTS over one of the AES key sizes, picked
/// at runtime from the length of the combined
/// `key1 || key2` key.
#[derive(Debug)]
pub enum XtsAes {
    Aes128(XtsContext<Aes128>),
    Aes192(XtsContext<Aes192>),
    Aes256(XtsContext<Aes256>),
}

impl XtsAes {
    pub fn from_combined_key(key: &[u8]) -> Result<Self> {
        let half = key.len() / 2;
        let xts = if key.len() % 2 != 0 {
            return Err(XtsError::InvalidKeyMaterial(
                "combined key must split into two equal halves",
            ));
        } else if half == Aes128::KEY_LEN {
            Self::Aes128(XtsContext::from_combined_key(key)?)
        } else if half == Aes192::KEY_LEN {
            Self::Aes192(XtsContext::from_combined_key(key)?)
        } else if half == Aes256::KEY_LEN {
            Self::Aes256(XtsContext::from_combined_key(key)?)
        } else {
            return Err(XtsError::InvalidKeyMaterial(
                "combined key must be 32, 48 or 64 bytes long",
            ));
        };
        debug!("Selected XTS-AES-{}", xts.key_bits());
        Ok(xts)
    }

    /// Size of a single AES key (not the combined one), in bits
    pub fn key_bits(&self) -> usize {
        let len = match self {
            Self::Aes128(_) => Aes128::KEY_LEN,
            Self::Aes192(_) => Aes192::KEY_LEN,
            Self::Aes256(_) => Aes256::KEY_LEN,
        };
        len * 8
    }

    pub fn encrypt(
        &self,
        raw_tweak: &Block,
        plaintext: &[u8],
        ciphertext: &mut [u8],
    ) -> Result<()> {
        match self {
            Self::Aes128(ctx) => ctx.encrypt(raw_tweak, plaintext, ciphertext),
            Self::Aes192(ctx) => ctx.encrypt(raw_tweak, plaintext, ciphertext),
            Self::Aes256(ctx) => ctx.encrypt(raw_tweak, plaintext, ciphertext),
        }
    }

    pub fn encrypt_in_place(&self, raw_tweak: &Block, data: &mut [u8]) -> Result<()> {
        match self {
            Self::Aes128(ctx) => ctx.encrypt_in_place(raw_tweak, data),
            Self::Aes192(ctx) => ctx.encrypt_in_place(raw_tweak, data),
            Self::Aes256(ctx) => ctx.encrypt_in_place(raw_tweak, data),
        }
    }
}
