//! Identifier newtypes: candidate tokens and district numbers.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde::de::{Error as DeError, Unexpected};

use crate::errors::CoreError;

/// Registry-assigned ids look like `c1`, `c2`, … (`c` + decimal counter, no leading zero).
fn is_candidate_token(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('c') else { return false };
    !digits.is_empty()
        && digits.len() <= 19
        && !digits.starts_with('0')
        && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Stable candidate identifier. Never reused within one registry.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    /// Build the id for counter value `n` (n ≥ 1).
    pub fn from_counter(n: u64) -> Self {
        CandidateId(format!("c{n}"))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Numeric suffix; ids are validated on construction so this always parses.
    pub fn counter(&self) -> u64 {
        self.0[1..].parse().unwrap_or(0)
    }
}

/// Numeric order (`c2` < `c10`), which is also registry insertion order.
impl Ord for CandidateId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.counter()
            .cmp(&other.counter())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for CandidateId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CandidateId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_candidate_token(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoreError::Validation(format!("invalid candidate id: {s}")))
        }
    }
}

impl<'de> Deserialize<'de> for CandidateId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        if is_candidate_token(&s) {
            Ok(CandidateId(s))
        } else {
            Err(D::Error::invalid_value(Unexpected::Str(&s), &"candidate id like \"c12\""))
        }
    }
}

/// District number, fixed at initialization (1..=N).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictId(pub u32);

impl DistrictId {
    pub fn get(self) -> u32 { self.0 }
}

impl fmt::Display for DistrictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
