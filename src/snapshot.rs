//! Account snapshots handed over by the game-state query client.
//!
//! The remote client itself lives outside this crate; it is expected to
//! materialize a [`GameSnapshot`] (usually as JSON) that the optimizer
//! ingests through [`GameSnapshot::into_inputs`].

use crate::catalog::{BaselineState, CardCatalog, RawCard};
use crate::consts::DEFAULT_BASELINE;
use crate::error::{CardForgeError, CfResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, alias = "delta")]
    pub attributes: Vec<i64>,
}

impl From<SnapshotCard> for RawCard {
    fn from(card: SnapshotCard) -> Self {
        RawCard {
            source_id: card.id,
            attributes: card.attributes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(default)]
    pub cards: Vec<SnapshotCard>,
    /// The account's current attributes. Missing means "use the default baseline".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<Vec<i64>>,
}

impl GameSnapshot {
    pub fn from_reader<R: Read>(reader: R) -> CfResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let file = File::open(path.as_ref())?;
        let snapshot = Self::from_reader(BufReader::new(file))?;
        debug!(
            "Snapshot {:?}: {} cards, local {}",
            path.as_ref(),
            snapshot.cards.len(),
            if snapshot.local.is_some() {
                "present"
            } else {
                "absent"
            }
        );
        Ok(snapshot)
    }

    /// Ingests the snapshot into the session's read-only inputs.
    pub fn into_inputs(self, dims: usize) -> CfResult<(CardCatalog, BaselineState)> {
        let baseline = match &self.local {
            Some(local) => BaselineState::from_raw(local, dims)?,
            None => {
                info!("No local attributes in snapshot, using default baseline");
                BaselineState::from_raw(&DEFAULT_BASELINE, dims)?
            }
        };
        let catalog = CardCatalog::from_records(self.cards, dims)?;
        Ok((catalog, baseline))
    }
}

/// Reads cards from CSV: one card per row, one column per attribute.
///
/// A header row is tolerated (rows whose first cell is not an integer are
/// skipped). Empty cells count as zero.
pub fn load_cards_csv<R: Read>(reader: R) -> CfResult<Vec<SnapshotCard>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut cards = Vec::new();
    let mut skipped = 0usize;
    let mut first_row = true;

    for result in rdr.records() {
        let rec = result?;
        if rec.iter().all(str::is_empty) {
            continue;
        }
        let is_first = std::mem::replace(&mut first_row, false);

        let mut attributes = Vec::with_capacity(rec.len());
        let mut ok = true;
        for cell in rec.iter() {
            if cell.is_empty() {
                attributes.push(0);
                continue;
            }
            match cell.parse::<i64>() {
                Ok(v) => attributes.push(v),
                Err(_) => {
                    ok = false;
                    break;
                }
            }
        }

        if ok {
            cards.push(SnapshotCard {
                id: None,
                attributes,
            });
        } else if is_first {
            debug!("Skipping CSV header row");
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        return Err(CardForgeError::Validation(format!(
            "{} CSV row(s) contain non-integer attributes",
            skipped
        )));
    }
    Ok(cards)
}

/// Supplier of account snapshots (the game-state query client's seam).
pub trait StateSource {
    fn fetch(&self) -> CfResult<GameSnapshot>;
}

/// Snapshot source backed by a file on disk.
///
/// `.csv` files contribute cards only; the baseline then comes from
/// `baseline` (or the default when that is `None`). Anything else is read
/// as a JSON [`GameSnapshot`], and `baseline`, when set, replaces its `local`.
#[derive(Debug, Clone)]
pub struct FileStateSource {
    pub path: PathBuf,
    pub baseline: Option<Vec<i64>>,
}

impl FileStateSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            baseline: None,
        }
    }

    pub fn with_baseline(mut self, baseline: Option<Vec<i64>>) -> Self {
        self.baseline = baseline;
        self
    }

    fn is_csv(&self) -> bool {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
    }
}

impl StateSource for FileStateSource {
    fn fetch(&self) -> CfResult<GameSnapshot> {
        let mut snapshot = if self.is_csv() {
            let file = File::open(&self.path)?;
            GameSnapshot {
                cards: load_cards_csv(BufReader::new(file))?,
                local: None,
            }
        } else {
            GameSnapshot::load_from_file(&self.path)?
        };

        if let Some(baseline) = &self.baseline {
            snapshot.local = Some(baseline.clone());
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_accepted_as_alias() {
        let json = r#"{ "cards": [ { "id": 7, "delta": [1, 2] } ], "local": [3] }"#;
        let snap = GameSnapshot::from_reader(json.as_bytes()).unwrap();
        assert_eq!(snap.cards[0].id, Some(7));
        assert_eq!(snap.cards[0].attributes, vec![1, 2]);
        assert_eq!(snap.local, Some(vec![3]));
    }

    #[test]
    fn csv_header_is_skipped() {
        let data = "a,b,c\n1,2,3\n-4,,6\n";
        let cards = load_cards_csv(data.as_bytes()).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].attributes, vec![-4, 0, 6]);
    }

    #[test]
    fn csv_header_after_blank_lines_is_skipped() {
        let data = "\n,,\nattr0,attr1\n1,2\n";
        let cards = load_cards_csv(data.as_bytes()).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].attributes, vec![1, 2]);
    }

    #[test]
    fn csv_garbage_row_is_rejected() {
        let data = "1,2,3\nx,y,z\n";
        assert!(load_cards_csv(data.as_bytes()).is_err());
    }
}
