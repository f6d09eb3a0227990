use serde::{Deserialize, Serialize};

/// Human-readable, year-scoped document number: `AP-<year>-<seq, zero-padded to 4>`.
/// Distinct from the internal numeric id and immutable once assigned.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentNumber(pub String);

impl DocumentNumber {
    pub fn compose(year: i32, seq: i64) -> Self {
        Self(format!("AP-{year}-{seq:04}"))
    }

    /// Splits a number back into `(year, seq)`. Returns `None` for anything
    /// that was not produced by `compose`.
    pub fn parts(&self) -> Option<(i32, i64)> {
        let rest = self.0.strip_prefix("AP-")?;
        let (year, seq) = rest.split_once('-')?;
        Some((year.parse().ok()?, seq.parse().ok()?))
    }
}

impl std::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
