//! The single-block primitive XTS is built on.
//!
//! XTS never chains or pads on its own; all it needs
//! is "encrypt these 16 bytes in place". Anything
//! able to do that can be plugged into an [`XtsContext`](super::XtsContext),
//! which is also how the mode is tested without AES.
use super::{Block, Result, XtsError};

use aes::{
    cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit},
    Aes128, Aes192, Aes256,
};

/// A 128-bit block cipher keyed once, then used
/// to encrypt single blocks in place.
pub trait BlockCipher: Sized {
    /// Key size in bytes
    const KEY_LEN: usize;
    /// Runs the key schedule. Fails if `key`
    /// is not exactly `KEY_LEN` bytes long.
    fn from_key(key: &[u8]) -> Result<Self>;
    /// Encrypts exactly one block, no chaining.
    fn encrypt_block(&self, block: &mut Block);
}

macro_rules! impl_aes_block_cipher {
    ($aes:ty, $key_len:expr) => {
        impl BlockCipher for $aes {
            const KEY_LEN: usize = $key_len;

            fn from_key(key: &[u8]) -> Result<Self> {
                <$aes as KeyInit>::new_from_slice(key).map_err(|_| {
                    XtsError::InvalidKeyMaterial("key length does not match the cipher")
                })
            }

            fn encrypt_block(&self, block: &mut Block) {
                BlockEncrypt::encrypt_block(self, GenericArray::from_mut_slice(block));
            }
        }
    };
}

impl_aes_block_cipher!(Aes128, 16);
impl_aes_block_cipher!(Aes192, 24);
impl_aes_block_cipher!(Aes256, 32);

/// Stand-ins used to test the mode itself
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Leaves every block untouched
    #[derive(Debug)]
    pub struct IdentityCipher;

    impl BlockCipher for IdentityCipher {
        const KEY_LEN: usize = 16;

        fn from_key(key: &[u8]) -> Result<Self> {
            if key.len() != Self::KEY_LEN {
                return Err(XtsError::InvalidKeyMaterial("bad test key"));
            }
            Ok(Self)
        }

        fn encrypt_block(&self, _block: &mut Block) {}
    }

    /// Adds the key to the block byte by byte. Unlike
    /// a XOR "cipher" the tweak does not cancel out.
    #[derive(Debug)]
    pub struct ByteAddCipher {
        pub key: Block,
    }

    impl BlockCipher for ByteAddCipher {
        const KEY_LEN: usize = 16;

        fn from_key(key: &[u8]) -> Result<Self> {
            let key = key
                .try_into()
                .map_err(|_| XtsError::InvalidKeyMaterial("bad test key"))?;
            Ok(Self { key })
        }

        fn encrypt_block(&self, block: &mut Block) {
            for (byte, k) in block.iter_mut().zip(self.key.iter()) {
                *byte = byte.wrapping_add(*k);
            }
        }
    }
}
