//! XTS encryption based off IEEE P1619 and NIST SP 800-38E,
//! including ciphertext stealing for data units that
//! are not a multiple of the block size.
use super::{Block, BlockCipher, Result, Tweak, XtsError, AES_BLOCK_SIZE};

use tracing::trace;

/// IEEE P1619 caps a data unit at 2^20 blocks
pub const MAX_DATA_UNIT_BLOCKS: usize = 1 << 20;

/// How a data unit splits into blocks. Computed
/// once per call so the full-block pass and the
/// stealing step agree on the boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUnit {
    pub full_blocks: usize,
    /// Bytes in the trailing partial block, `0..16`
    pub remainder: usize,
}

impl DataUnit {
    pub fn of(len: usize) -> Result<Self> {
        let layout = Self {
            full_blocks: len / AES_BLOCK_SIZE,
            remainder: len % AES_BLOCK_SIZE,
        };
        if layout.full_blocks == 0 || layout.blocks() > MAX_DATA_UNIT_BLOCKS {
            return Err(XtsError::InvalidInputLength { len });
        }
        Ok(layout)
    }

    /// Total block count, the partial one included
    pub fn blocks(&self) -> usize {
        self.full_blocks + usize::from(self.remainder != 0)
    }

    pub fn needs_stealing(&self) -> bool {
        self.remainder != 0
    }

    /// Blocks encrypted without taking part in
    /// ciphertext stealing
    fn standalone_blocks(&self) -> usize {
        if self.needs_stealing() {
            self.full_blocks - 1
        } else {
            self.full_blocks
        }
    }
}

/// The cipher needs to prepare the keys before
/// encryption can occur. Since this requires some
/// computation, the keyed instances live inside a
/// context that can be reused for many data units.
#[derive(Debug)]
pub struct XtsContext<C: BlockCipher> {
    data_ctx: C,
    tweak_ctx: C,
}

fn xor_inplace<const N: usize>(dst: &mut [u8; N], other: &[u8; N]) {
    for (dst, &src) in dst.iter_mut().zip(other.iter()) {
        *dst ^= src
    }
}

/// PP = P_m || CC[r..16]: the partial plaintext padded
/// with the ciphertext bytes that do not make it into C_m.
fn composite_block(tail_plaintext: &[u8], stolen: &Block) -> Block {
    let mut block = *stolen;
    block[..tail_plaintext.len()].copy_from_slice(tail_plaintext);
    block
}

/// Swaps the two trailing ciphertext segments: the last full
/// block receives `final_block`, the short tail receives the
/// head of `stolen`.
fn cross_assign(last_full: &mut [u8], tail: &mut [u8], stolen: &Block, final_block: &Block) {
    tail.copy_from_slice(&stolen[..tail.len()]);
    last_full.copy_from_slice(final_block);
}

impl<C: BlockCipher> XtsContext<C> {
    /// `data_key` is key1, `tweak_key` is key2.
    pub fn new(data_key: impl AsRef<[u8]>, tweak_key: impl AsRef<[u8]>) -> Result<Self> {
        let (data_key, tweak_key) = (data_key.as_ref(), tweak_key.as_ref());
        if data_key == tweak_key {
            return Err(XtsError::InvalidKeyMaterial(
                "data and tweak keys must be independent",
            ));
        }
        trace!("Keying XTS context with {} byte keys", data_key.len());
        Ok(Self {
            data_ctx: C::from_key(data_key)?,
            tweak_ctx: C::from_key(tweak_key)?,
        })
    }

    /// Splits `key1 || key2` in half
    pub fn from_combined_key(key: impl AsRef<[u8]>) -> Result<Self> {
        let key = key.as_ref();
        if key.len() != 2 * C::KEY_LEN {
            return Err(XtsError::InvalidKeyMaterial(
                "combined key must hold exactly two cipher keys",
            ));
        }
        let (data_key, tweak_key) = key.split_at(C::KEY_LEN);
        Self::new(data_key, tweak_key)
    }

    /// T0 is the raw tweak encrypted under key2
    pub fn initial_tweak(&self, raw_tweak: &Block) -> Tweak {
        let mut bytes = *raw_tweak;
        self.tweak_ctx.encrypt_block(&mut bytes);
        Tweak::from(bytes)
    }

    fn xts_encrypt_block(&self, block: &mut Block, tweak_bytes: &Block) {
        xor_inplace(block, tweak_bytes);
        self.data_ctx.encrypt_block(block);
        xor_inplace(block, tweak_bytes);
    }

    /// Encrypts `plaintext` into the front of `ciphertext`,
    /// leaving the input untouched.
    pub fn encrypt(
        &self,
        raw_tweak: &Block,
        plaintext: &[u8],
        ciphertext: &mut [u8],
    ) -> Result<()> {
        DataUnit::of(plaintext.len())?;
        if ciphertext.len() < plaintext.len() {
            return Err(XtsError::OutputTooSmall {
                expected: plaintext.len(),
                actual: ciphertext.len(),
            });
        }
        let out = &mut ciphertext[..plaintext.len()];
        out.copy_from_slice(plaintext);
        self.encrypt_in_place(raw_tweak, out)
    }

    /// Encrypts a single data unit in place, so `data`
    /// holds ciphertext afterwards.
    pub fn encrypt_in_place(&self, raw_tweak: &Block, data: &mut [u8]) -> Result<()> {
        let layout = DataUnit::of(data.len())?;
        trace!(
            "Encrypting {} bytes: {} full blocks, {} trailing bytes",
            data.len(),
            layout.full_blocks,
            layout.remainder
        );
        let mut tweak = self.initial_tweak(raw_tweak);

        let (body, tail) = data.split_at_mut(layout.full_blocks * AES_BLOCK_SIZE);
        let (standalone, last_full) =
            body.split_at_mut(layout.standalone_blocks() * AES_BLOCK_SIZE);

        let mut block: Block = [0; AES_BLOCK_SIZE];
        for chunk in standalone.chunks_exact_mut(AES_BLOCK_SIZE) {
            block.copy_from_slice(chunk);
            self.xts_encrypt_block(&mut block, &tweak.advance());
            chunk.copy_from_slice(&block);
        }

        if layout.needs_stealing() {
            trace!(
                "Stealing {} bytes from the last full block",
                AES_BLOCK_SIZE - layout.remainder
            );
            // CC, encrypted under the tweak of block n-1
            let mut stolen: Block = [0; AES_BLOCK_SIZE];
            stolen.copy_from_slice(last_full);
            self.xts_encrypt_block(&mut stolen, &tweak.advance());

            let mut final_block = composite_block(tail, &stolen);
            self.xts_encrypt_block(&mut final_block, &tweak.last());

            cross_assign(last_full, tail, &stolen, &final_block);
        }
        Ok(())
    }
}

/// One-shot encryption of a single data unit with separate keys.
pub fn xts_encrypt<C: BlockCipher>(
    raw_tweak: &Block,
    data_key: &[u8],
    tweak_key: &[u8],
    plaintext: &[u8],
    ciphertext: &mut [u8],
) -> Result<()> {
    XtsContext::<C>::new(data_key, tweak_key)?.encrypt(raw_tweak, plaintext, ciphertext)
}
