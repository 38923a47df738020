//! Runs parsed vectors through the encryptor and
//! records how each of them went.
use super::{Direction, TestVector};
use crate::xts::{XtsAes, XtsError};

use std::fmt;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed { expected: Vec<u8>, actual: Vec<u8> },
    /// The data unit does not end on a byte boundary
    Skipped,
    /// The encryptor refused the key or the data unit
    Rejected(XtsError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorResult {
    pub direction: Direction,
    pub count: u32,
    pub outcome: Outcome,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub results: Vec<VectorResult>,
}

impl Report {
    fn tally(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn passed(&self) -> usize {
        self.tally(|o| matches!(o, Outcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.tally(|o| matches!(o, Outcome::Failed { .. } | Outcome::Rejected(_)))
    }

    pub fn skipped(&self) -> usize {
        self.tally(|o| matches!(o, Outcome::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &VectorResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. } | Outcome::Rejected(_)))
    }
}

impl fmt::Display for VectorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = match self.direction {
            Direction::Encrypt => "ENCRYPT",
            Direction::Decrypt => "DECRYPT",
        };
        match &self.outcome {
            Outcome::Passed => write!(f, "[{section}] vector {} passed", self.count),
            Outcome::Skipped => write!(f, "[{section}] vector {} skipped", self.count),
            Outcome::Rejected(err) => {
                write!(f, "[{section}] vector {} rejected: {err}", self.count)
            }
            Outcome::Failed { expected, actual } => {
                writeln!(f, "[{section}] vector {} failed", self.count)?;
                writeln!(f, "Expected: {}", hex::encode(expected))?;
                write!(f, "Got:      {}", hex::encode(actual))
            }
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}

/// Encrypts the plaintext of `vector` and compares it
/// with the expected ciphertext. Vectors from the decrypt
/// section are checked the same way, as the pair holds
/// in both directions.
pub fn run_vector(vector: &TestVector) -> Outcome {
    if !vector.is_byte_aligned() {
        trace!("Skipping vector {}: data unit is not whole bytes", vector.count);
        return Outcome::Skipped;
    }
    let xts = match XtsAes::from_combined_key(&vector.key) {
        Ok(xts) => xts,
        Err(err) => return Outcome::Rejected(err),
    };
    let mut actual = vec![0; vector.plaintext.len()];
    if let Err(err) = xts.encrypt(&vector.tweak, &vector.plaintext, &mut actual) {
        return Outcome::Rejected(err);
    }
    if actual == vector.ciphertext {
        Outcome::Passed
    } else {
        Outcome::Failed {
            expected: vector.ciphertext.clone(),
            actual,
        }
    }
}

pub fn run_vectors(vectors: &[TestVector]) -> Report {
    let results = vectors
        .iter()
        .map(|vector| VectorResult {
            direction: vector.direction,
            count: vector.count,
            outcome: run_vector(vector),
        })
        .collect();
    let report = Report { results };
    debug!("Vector run finished: {report}");
    report
}

#[cfg(test)]
mod tests {
    use super::super::parse_rsp;
    use super::*;

    const STEALING_VECTORS: &str = "\
[ENCRYPT]
COUNT = 0
Key = fffefdfcfbfaf9f8f7f6f5f4f3f2f1f0bfbebdbcbbbab9b8b7b6b5b4b3b2b1b0
i = 9a785634120000000000000000000000
PT = 000102030405060708090a0b0c0d0e0f10
CT = 6c1625db4671522d3d7599601de7ca09ed

COUNT = 1
Key = fffefdfcfbfaf9f8f7f6f5f4f3f2f1f0bfbebdbcbbbab9b8b7b6b5b4b3b2b1b0
i = 9a785634120000000000000000000000
PT = 000102030405060708090a0b0c0d0e0f1011
CT = d069444b7a7e0cab09e24447d24deb1fedbf

COUNT = 2
Key = fffefdfcfbfaf9f8f7f6f5f4f3f2f1f0bfbebdbcbbbab9b8b7b6b5b4b3b2b1b0
i = 9a785634120000000000000000000000
PT = 000102030405060708090a0b0c0d0e0f101112
CT = e5df1351c0544ba1350b3363cd8ef4beedbf9d

[DECRYPT]
COUNT = 3
Key = fffefdfcfbfaf9f8f7f6f5f4f3f2f1f0bfbebdbcbbbab9b8b7b6b5b4b3b2b1b0
i = 9a785634120000000000000000000000
CT = 9d84c813f719aa2c7be3f66171c7c5c2edbf9dac
PT = 000102030405060708090a0b0c0d0e0f10111213
";

    const BROKEN_VECTORS: &str = "\
[ENCRYPT]
COUNT = 0
Key = fffefdfcfbfaf9f8f7f6f5f4f3f2f1f0bfbebdbcbbbab9b8b7b6b5b4b3b2b1b0
i = 9a785634120000000000000000000000
PT = 000102030405060708090a0b0c0d0e0f10
CT = 6c1625db4671522d3d7599601de7ca09ee

COUNT = 1
DataUnitLen = 130
Key = fffefdfcfbfaf9f8f7f6f5f4f3f2f1f0bfbebdbcbbbab9b8b7b6b5b4b3b2b1b0
i = 9a785634120000000000000000000000
PT = 000102030405060708090a0b0c0d0e0f1000
CT = 000102030405060708090a0b0c0d0e0f1000

COUNT = 2
Key = 0000000000000000000000000000000000000000000000000000000000000000
i = 00000000000000000000000000000000
PT = 0000000000000000000000000000000000000000000000000000000000000000
CT = 917cf69ebd68b2ec9b9fe9a3eadda692cd43d2f59598ed858c02c2652fbf922e

COUNT = 3
Key = fffefdfcfbfaf9f8f7f6f5f4f3f2f1f0bfbebdbcbbbab9b8b7b6b5b4b3b2b1b0
i = 9a785634120000000000000000000000
PT = 000102
CT = 000102
";

    #[test]
    fn test_stealing_vectors_pass() {
        let vectors = parse_rsp(STEALING_VECTORS).unwrap();
        let report = run_vectors(&vectors);
        assert_eq!(report.passed(), 4);
        assert!(report.is_success());
        assert_eq!(report.to_string(), "4 passed, 0 failed, 0 skipped");
    }

    #[test]
    fn test_failures_are_reported() {
        let vectors = parse_rsp(BROKEN_VECTORS).unwrap();
        let report = run_vectors(&vectors);
        assert!(!report.is_success());
        assert_eq!(report.passed(), 0);
        assert_eq!(report.failed(), 3);
        assert_eq!(report.skipped(), 1);

        let outcomes: Vec<_> = report.results.iter().map(|r| &r.outcome).collect();
        assert!(matches!(outcomes[0], Outcome::Failed { .. }));
        assert_eq!(outcomes[1], &Outcome::Skipped);
        assert!(matches!(
            outcomes[2],
            Outcome::Rejected(XtsError::InvalidKeyMaterial(_))
        ));
        assert_eq!(
            outcomes[3],
            &Outcome::Rejected(XtsError::InvalidInputLength { len: 3 })
        );

        let first = report.failures().next().unwrap().to_string();
        assert_eq!(
            first,
            "[ENCRYPT] vector 0 failed\n\
             Expected: 6c1625db4671522d3d7599601de7ca09ee\n\
             Got:      6c1625db4671522d3d7599601de7ca09ed"
        );
    }

    #[test]
    fn test_runs_are_repeatable() {
        let mut vectors = parse_rsp(STEALING_VECTORS).unwrap();
        vectors.extend(parse_rsp(BROKEN_VECTORS).unwrap());
        let first = run_vectors(&vectors);
        let second = run_vectors(&vectors);
        assert_eq!(first, second);
    }
}
