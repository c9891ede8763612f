use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use super::model::{League, OddsRow, Snapshot};

pub const MIN_LABEL_LENGTH: usize = 1;
pub const MAX_LABEL_LENGTH: usize = 10;

// ---------------------------------------------------------------------------
// Filter predicate
// ---------------------------------------------------------------------------

/// Competition selection; `All` is the "ALL" sentinel of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeagueFilter {
    All,
    Only(League),
}

impl LeagueFilter {
    pub fn matches(self, row: &OddsRow) -> bool {
        match self {
            LeagueFilter::All => true,
            LeagueFilter::Only(league) => row.league == league.tag(),
        }
    }
}

impl fmt::Display for LeagueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeagueFilter::All => f.write_str("ALL"),
            LeagueFilter::Only(league) => write!(f, "{league}"),
        }
    }
}

/// Indices of rows passing the league and date filters, in snapshot order.
pub fn filtered_indices(snapshot: &Snapshot, league: LeagueFilter, since: NaiveDate) -> Vec<usize> {
    snapshot
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| league.matches(row) && row.refreshed_on >= since)
        .map(|(i, _)| i)
        .collect()
}

/// `home[..n] + "-" + away[..n]`, counted in characters.
pub fn text_name(home: &str, away: &str, length: usize) -> String {
    let home: String = home.chars().take(length).collect();
    let away: String = away.chars().take(length).collect();
    format!("{home}-{away}")
}

// ---------------------------------------------------------------------------
// Table – a filtered view with its label column
// ---------------------------------------------------------------------------

/// A per-request view of the snapshot. The snapshot itself is never touched;
/// `text_name` lives here because it depends on the label length.
#[derive(Debug, Clone)]
pub struct Table {
    snapshot: Arc<Snapshot>,
    indices: Vec<usize>,
    text_names: Vec<String>,
}

/// One row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct ViewRow<'a> {
    pub row: &'a OddsRow,
    pub text_name: &'a str,
}

impl Table {
    pub fn build(
        snapshot: Arc<Snapshot>,
        league: LeagueFilter,
        since: NaiveDate,
        label_length: usize,
    ) -> Self {
        let length = label_length.clamp(MIN_LABEL_LENGTH, MAX_LABEL_LENGTH);
        let indices = filtered_indices(&snapshot, league, since);
        let text_names = indices
            .iter()
            .map(|&i| {
                let row = &snapshot.rows[i];
                text_name(&row.home_team, &row.away_team, length)
            })
            .collect();
        Self {
            snapshot,
            indices,
            text_names,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn get(&self, i: usize) -> Option<ViewRow<'_>> {
        let idx = *self.indices.get(i)?;
        Some(ViewRow {
            row: &self.snapshot.rows[idx],
            text_name: &self.text_names[i],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = ViewRow<'_>> + '_ {
        self.indices
            .iter()
            .zip(&self.text_names)
            .map(|(&idx, text_name)| ViewRow {
                row: &self.snapshot.rows[idx],
                text_name,
            })
    }
}
