//! Reader for NIST CAVS `.rsp` response files
//! (XTSGenAES128.rsp, XTSGenAES256.rsp, ...).
//!
//! A file is a list of `[ENCRYPT]` / `[DECRYPT]` sections,
//! each holding records that start with `COUNT = n`
//! followed by `name = value` lines.
use crate::xts::Block;
use thiserror::Error;
use tracing::{debug, trace};

pub mod harness;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VectorError {
    #[error("Line {line}: expected `name = value`")]
    MalformedLine { line: usize },
    #[error("Line {line}: bad value for {field}")]
    InvalidValue { line: usize, field: &'static str },
    #[error("Line {line}: invalid hex")]
    InvalidHex {
        line: usize,
        #[source]
        source: hex::FromHexError,
    },
    #[error("Line {line}: unknown section {name}")]
    UnknownSection { line: usize, name: String },
    #[error("Line {line}: record found outside of a section")]
    NoSection { line: usize },
    #[error("Vector {count} has no {field}")]
    MissingField { count: u32, field: &'static str },
}

type Result<T> = std::result::Result<T, VectorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    pub direction: Direction,
    pub count: u32,
    /// Data unit length in bits, if the file states it
    pub data_unit_bits: Option<usize>,
    /// `key1 || key2`
    pub key: Vec<u8>,
    pub tweak: Block,
    pub plaintext: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl TestVector {
    /// Vectors whose data unit ends in a partial
    /// byte cannot be expressed as byte buffers.
    pub fn is_byte_aligned(&self) -> bool {
        match self.data_unit_bits {
            Some(bits) => bits % 8 == 0 && bits / 8 == self.plaintext.len(),
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct PendingVector {
    count: u32,
    data_unit_bits: Option<usize>,
    key: Option<Vec<u8>>,
    tweak: Option<Block>,
    plaintext: Option<Vec<u8>>,
    ciphertext: Option<Vec<u8>>,
}

impl PendingVector {
    fn finish(self, direction: Direction) -> Result<TestVector> {
        let count = self.count;
        let missing = |field| VectorError::MissingField { count, field };
        Ok(TestVector {
            direction,
            count,
            data_unit_bits: self.data_unit_bits,
            key: self.key.ok_or_else(|| missing("Key"))?,
            tweak: self.tweak.ok_or_else(|| missing("i"))?,
            plaintext: self.plaintext.ok_or_else(|| missing("PT"))?,
            ciphertext: self.ciphertext.ok_or_else(|| missing("CT"))?,
        })
    }
}

fn decode_hex(value: &str, line: usize) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|source| VectorError::InvalidHex { line, source })
}

fn parse_number<T: std::str::FromStr>(value: &str, line: usize, field: &'static str) -> Result<T> {
    value
        .parse()
        .map_err(|_| VectorError::InvalidValue { line, field })
}

/// Parses every vector in `input`, in file order.
pub fn parse_rsp(input: &str) -> Result<Vec<TestVector>> {
    let mut vectors = Vec::new();
    let mut direction = None;
    let mut pending: Option<PendingVector> = None;

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        if let Some(name) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            if let (Some(vector), Some(dir)) = (pending.take(), direction) {
                vectors.push(vector.finish(dir)?);
            }
            direction = Some(match name.trim().to_ascii_uppercase().as_str() {
                "ENCRYPT" => Direction::Encrypt,
                "DECRYPT" => Direction::Decrypt,
                _ => {
                    return Err(VectorError::UnknownSection {
                        line,
                        name: name.to_string(),
                    })
                }
            });
            trace!("Entering section {name}");
            continue;
        }

        let (field, value) = text
            .split_once('=')
            .ok_or(VectorError::MalformedLine { line })?;
        let (field, value) = (field.trim().to_ascii_uppercase(), value.trim());

        if field == "COUNT" {
            let dir = direction.ok_or(VectorError::NoSection { line })?;
            if let Some(vector) = pending.take() {
                vectors.push(vector.finish(dir)?);
            }
            pending = Some(PendingVector {
                count: parse_number(value, line, "COUNT")?,
                ..Default::default()
            });
            continue;
        }

        // fields before the first COUNT belong to the file header
        let Some(vector) = pending.as_mut() else {
            continue;
        };
        match field.as_str() {
            "DATAUNITLEN" => {
                vector.data_unit_bits = Some(parse_number(value, line, "DataUnitLen")?)
            }
            "KEY" => vector.key = Some(decode_hex(value, line)?),
            "I" => {
                let tweak = decode_hex(value, line)?;
                let tweak: Block = tweak
                    .try_into()
                    .map_err(|_| VectorError::InvalidValue { line, field: "i" })?;
                vector.tweak = Some(tweak);
            }
            "DATAUNITSEQNUMBER" => {
                let number: u128 = parse_number(value, line, "DataUnitSeqNumber")?;
                vector.tweak = Some(number.to_le_bytes());
            }
            "PT" => vector.plaintext = Some(decode_hex(value, line)?),
            "CT" => vector.ciphertext = Some(decode_hex(value, line)?),
            _ => trace!("Ignoring field {field} on line {line}"),
        }
    }

    if let (Some(vector), Some(dir)) = (pending, direction) {
        vectors.push(vector.finish(dir)?);
    }
    debug!("Parsed {} test vectors", vectors.len());
    Ok(vectors)
}
