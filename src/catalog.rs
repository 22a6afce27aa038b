use crate::error::{CardForgeError, CfResult};
use serde::Serialize;
use std::fmt;
use std::ops::Index;
use tracing::{info, warn};

/// A resource state: a fixed number of signed attribute values.
///
/// The length is fixed when the vector is ingested and never changes
/// afterwards; every vector within one session shares the same dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AttributeVector(Box<[i64]>);

impl AttributeVector {
    /// Normalizes a raw record to exactly `dims` entries.
    ///
    /// Shorter records are padded with trailing zeros. Longer records are
    /// truncated; the returned flag reports whether anything was dropped.
    fn ingest(raw: &[i64], dims: usize) -> (Self, bool) {
        let mut values = vec![0i64; dims];
        let n = raw.len().min(dims);
        values[..n].copy_from_slice(&raw[..n]);
        (Self(values.into_boxed_slice()), raw.len() > dims)
    }

    pub(crate) fn zeroed(dims: usize) -> Self {
        Self(vec![0; dims].into_boxed_slice())
    }

    #[inline(always)]
    pub fn dims(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Saturating element-wise add.
    #[inline(always)]
    pub(crate) fn add_assign(&mut self, delta: &AttributeVector) {
        for (v, d) in self.0.iter_mut().zip(delta.0.iter()) {
            *v = v.saturating_add(*d);
        }
    }

    /// Builds a vector from exact wide totals, or `None` if any entry does
    /// not fit in an `i64`.
    pub(crate) fn try_from_wide(values: &[i128]) -> Option<Self> {
        values
            .iter()
            .map(|&v| i64::try_from(v).ok())
            .collect::<Option<Box<[i64]>>>()
            .map(Self)
    }

    /// Element-wise `self - other`, saturating.
    pub fn difference(&self, other: &AttributeVector) -> AttributeVector {
        let values: Vec<i64> = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a.saturating_sub(*b))
            .collect();
        Self(values.into_boxed_slice())
    }

    /// Saturating sum of all entries.
    pub fn sum(&self) -> i64 {
        self.0.iter().fold(0i64, |acc, &v| acc.saturating_add(v))
    }

    pub fn has_negative(&self) -> bool {
        self.0.iter().any(|&v| v < 0)
    }

    /// Copy with negative entries shown as zero.
    pub fn clamped(&self) -> AttributeVector {
        Self(self.0.iter().map(|&v| v.max(0)).collect())
    }
}

impl Index<usize> for AttributeVector {
    type Output = i64;

    fn index(&self, idx: usize) -> &i64 {
        &self.0[idx]
    }
}

impl fmt::Display for AttributeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

/// One program card. `id` is always the card's position in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardProfile {
    pub id: usize,
    /// Identifier carried by the upstream record, kept for display only.
    pub source_id: Option<u64>,
    pub delta: AttributeVector,
}

/// A raw card record as handed over by the state collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub source_id: Option<u64>,
    pub attributes: Vec<i64>,
}

impl From<Vec<i64>> for RawCard {
    fn from(attributes: Vec<i64>) -> Self {
        Self {
            source_id: None,
            attributes,
        }
    }
}

/// Immutable set of card profiles for one optimization session.
#[derive(Debug, Clone)]
pub struct CardCatalog {
    cards: Vec<CardProfile>,
    dims: usize,
}

impl CardCatalog {
    /// The only way to build a catalog. Fails on an empty record set or a
    /// zero dimension; never fails because of padding.
    pub fn from_records<I, R>(records: I, dims: usize) -> CfResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<RawCard>,
    {
        if dims == 0 {
            return Err(CardForgeError::Config(
                "attribute dimension must be positive".to_string(),
            ));
        }

        let mut cards = Vec::new();
        let mut padded = 0usize;
        let mut truncated = 0usize;

        for (id, raw) in records.into_iter().enumerate() {
            let raw = raw.into();
            if raw.attributes.len() < dims {
                padded += 1;
            }
            let (delta, was_truncated) = AttributeVector::ingest(&raw.attributes, dims);
            if was_truncated {
                truncated += 1;
            }
            cards.push(CardProfile {
                id,
                source_id: raw.source_id,
                delta,
            });
        }

        if cards.is_empty() {
            return Err(CardForgeError::Config("card catalog is empty".to_string()));
        }

        if truncated > 0 {
            warn!(
                "⚠️  {} card record(s) longer than {} attributes were truncated",
                truncated, dims
            );
        }
        info!(
            "🃏 Catalog ingested: {} cards x {} dims ({} padded)",
            cards.len(),
            dims,
            padded
        );

        Ok(Self { cards, dims })
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[inline(always)]
    pub fn dims(&self) -> usize {
        self.dims
    }

    #[inline(always)]
    pub fn card(&self, id: usize) -> &CardProfile {
        &self.cards[id]
    }

    pub fn get(&self, id: usize) -> Option<&CardProfile> {
        self.cards.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardProfile> {
        self.cards.iter()
    }
}

/// Resource state before any card is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BaselineState(AttributeVector);

impl BaselineState {
    pub fn from_raw(raw: &[i64], dims: usize) -> CfResult<Self> {
        if dims == 0 {
            return Err(CardForgeError::Config(
                "attribute dimension must be positive".to_string(),
            ));
        }
        let (state, truncated) = AttributeVector::ingest(raw, dims);
        if truncated {
            warn!(
                "⚠️  Baseline has {} values, keeping the first {}",
                raw.len(),
                dims
            );
        }
        Ok(Self(state))
    }

    #[inline(always)]
    pub fn state(&self) -> &AttributeVector {
        &self.0
    }

    pub fn dims(&self) -> usize {
        self.0.dims()
    }
}

/// Ordered selection of card ids. Repetition is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Combination(Vec<usize>);

impl Combination {
    /// Builds a combination after checking every id against the catalog.
    pub fn checked(ids: Vec<usize>, catalog: &CardCatalog) -> CfResult<Self> {
        if ids.is_empty() {
            return Err(CardForgeError::Validation(
                "combination must contain at least one card".to_string(),
            ));
        }
        if let Some(&bad) = ids.iter().find(|&&id| id >= catalog.len()) {
            return Err(CardForgeError::Validation(format!(
                "card id {} is out of range (catalog has {} cards)",
                bad,
                catalog.len()
            )));
        }
        Ok(Self(ids))
    }

    /// Caller guarantees every id is below the catalog size.
    #[inline(always)]
    pub(crate) fn from_ids_unchecked(ids: Vec<usize>) -> Self {
        Self(ids)
    }

    #[inline(always)]
    pub fn ids(&self) -> &[usize] {
        &self.0
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, slot: usize, id: usize) {
        self.0[slot] = id;
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_pads_short_records() {
        let (v, truncated) = AttributeVector::ingest(&[1, 2], 4);
        assert_eq!(v.as_slice(), &[1, 2, 0, 0]);
        assert!(!truncated);
    }

    #[test]
    fn ingest_truncates_long_records() {
        let (v, truncated) = AttributeVector::ingest(&[1, 2, 3, 4, 5], 3);
        assert_eq!(v.as_slice(), &[1, 2, 3]);
        assert!(truncated);
    }

    #[test]
    fn difference_and_sum() {
        let (a, _) = AttributeVector::ingest(&[5, 3, -1], 3);
        let (b, _) = AttributeVector::ingest(&[2, 3, 1], 3);
        let d = a.difference(&b);
        assert_eq!(d.as_slice(), &[3, 0, -2]);
        assert_eq!(d.sum(), 1);
        assert!(d.has_negative());
        assert_eq!(d.clamped().as_slice(), &[3, 0, 0]);
    }

    #[test]
    fn arithmetic_saturates_instead_of_wrapping() {
        let (mut a, _) = AttributeVector::ingest(&[i64::MAX, i64::MIN], 2);
        let (b, _) = AttributeVector::ingest(&[1, -1], 2);
        a.add_assign(&b);
        assert_eq!(a.as_slice(), &[i64::MAX, i64::MIN]);
        assert_eq!(a.difference(&b).as_slice(), &[i64::MAX - 1, i64::MIN + 1]);
        assert_eq!(a.sum(), -1);

        let (big, _) = AttributeVector::ingest(&[i64::MAX, i64::MAX], 2);
        assert_eq!(big.sum(), i64::MAX);
    }

    #[test]
    fn wide_totals_must_fit() {
        let v = AttributeVector::try_from_wide(&[5, -3]).unwrap();
        assert_eq!(v.as_slice(), &[5, -3]);
        assert!(AttributeVector::try_from_wide(&[i128::from(i64::MAX) + 1, 0]).is_none());
    }

    #[test]
    fn display_is_compact() {
        let (a, _) = AttributeVector::ingest(&[1, -2], 2);
        assert_eq!(a.to_string(), "[1,-2]");
        let c = Combination::from_ids_unchecked(vec![0, 3, 3]);
        assert_eq!(c.to_string(), "0,3,3");
    }
}
