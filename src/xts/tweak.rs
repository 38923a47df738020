use super::Block;

/// Low byte of the GF(2^128) modulus
/// x^128 + x^7 + x^2 + x + 1
const GF_128_FDBK: u8 = 0x87;

/// Multiplies `bytes` by x in GF(2^128).
/// Byte 0 is the least significant one.
pub fn gf128_mul_x(bytes: &mut Block) {
    let mut cin = 0;
    let mut cout = 0;
    for byte in bytes.iter_mut() {
        cout = *byte >> 7;
        *byte = (*byte << 1) | cin;
        cin = cout;
    }
    if cout > 0 {
        bytes[0] ^= GF_128_FDBK;
    }
}

/// Whitening value of the current block
/// inside a data unit.
#[derive(Debug)]
pub struct Tweak {
    bytes: Block,
}

impl From<Block> for Tweak {
    fn from(bytes: Block) -> Self {
        Self { bytes }
    }
}

impl Tweak {
    /// Returns the tweak of the current block and
    /// moves on to the next one. Call it exactly
    /// once per full block, in order.
    pub fn advance(&mut self) -> Block {
        let copy = self.bytes;
        gf128_mul_x(&mut self.bytes);
        copy
    }

    /// Returns the tweak of the final block
    /// without advancing past it.
    pub fn last(self) -> Block {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_shift_without_carry() {
        let mut bytes = hex!("01000000000000000000000000000000");
        gf128_mul_x(&mut bytes);
        assert_eq!(bytes, hex!("02000000000000000000000000000000"));

        // the top bit of a byte moves into the next one
        let mut bytes = hex!("80000000000000000000000000000040");
        gf128_mul_x(&mut bytes);
        assert_eq!(bytes, hex!("00010000000000000000000000000080"));
    }

    #[test]
    fn test_reduction_on_carry() {
        let mut bytes = hex!("00000000000000000000000000000080");
        gf128_mul_x(&mut bytes);
        assert_eq!(bytes, hex!("87000000000000000000000000000000"));

        let mut bytes = [0xff; 16];
        gf128_mul_x(&mut bytes);
        assert_eq!(bytes, hex!("79ffffffffffffffffffffffffffffff"));
    }

    #[test]
    fn test_advance_returns_previous_value() {
        let mut tweak = Tweak::from(hex!("00000000000000000000000000000080"));
        assert_eq!(tweak.advance(), hex!("00000000000000000000000000000080"));
        assert_eq!(tweak.advance(), hex!("87000000000000000000000000000000"));
        assert_eq!(tweak.last(), hex!("0e010000000000000000000000000000"));
    }

    #[test]
    fn test_x128_wraps_to_modulus() {
        // x^127 * x == x^7 + x^2 + x + 1
        let mut bytes = [0; 16];
        bytes[15] = 0x80;
        let mut tweak = Tweak::from(bytes);
        tweak.advance();
        assert_eq!(tweak.last(), hex!("87000000000000000000000000000000"));

        // 128 doublings of 1 land on the same value
        let mut tweak = Tweak::from(hex!("01000000000000000000000000000000"));
        for _ in 0..128 {
            tweak.advance();
        }
        assert_eq!(tweak.last(), hex!("87000000000000000000000000000000"));
    }
}
