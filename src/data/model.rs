use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// League – the competition parsed from the pre-match URL
// ---------------------------------------------------------------------------

/// Competitions the dashboard knows how to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum League {
    SerieA,
    PremierLeague,
    Liga,
    Bundesliga,
    Ligue1,
    ChampionsLeague,
    EuropaLeague,
}

impl League {
    pub const ALL: [League; 7] = [
        League::SerieA,
        League::PremierLeague,
        League::Liga,
        League::Bundesliga,
        League::Ligue1,
        League::ChampionsLeague,
        League::EuropaLeague,
    ];

    /// Tag as it appears after URL normalisation (`SERIE%20A` → `SERIE_A`).
    pub fn tag(self) -> &'static str {
        match self {
            League::SerieA => "SERIE_A",
            League::PremierLeague => "PREMIER_LEAGUE",
            League::Liga => "LIGA",
            League::Bundesliga => "BUNDESLIGA",
            League::Ligue1 => "LIGUE_1",
            League::ChampionsLeague => "CHAMPIONS_LEAGUE",
            League::EuropaLeague => "EUROPA_LEAGUE",
        }
    }

    pub fn from_tag(tag: &str) -> Option<League> {
        League::ALL.into_iter().find(|l| l.tag() == tag)
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Column – numeric columns of the export
// ---------------------------------------------------------------------------

/// Every numeric (odds or margin) column of the pre-match export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Odds1,
    OddsX,
    Odds2,
    Odds1X,
    OddsX2,
    Odds12,
    OddsGol,
    OddsNogol,
    OddsUnder25,
    OddsOver25,
    Vig1X2,
    VigDc,
    VigGng,
    VigUo25,
}

impl Column {
    pub const ODDS: [Column; 10] = [
        Column::Odds1,
        Column::OddsX,
        Column::Odds2,
        Column::Odds1X,
        Column::OddsX2,
        Column::Odds12,
        Column::OddsGol,
        Column::OddsNogol,
        Column::OddsUnder25,
        Column::OddsOver25,
    ];

    pub const MARGINS: [Column; 4] = [Column::Vig1X2, Column::VigDc, Column::VigGng, Column::VigUo25];

    /// Header name in the CSV export.
    pub fn header(self) -> &'static str {
        match self {
            Column::Odds1 => "odds_1",
            Column::OddsX => "odds_X",
            Column::Odds2 => "odds_2",
            Column::Odds1X => "odds_1X",
            Column::OddsX2 => "odds_X2",
            Column::Odds12 => "odds_12",
            Column::OddsGol => "odds_gol",
            Column::OddsNogol => "odds_nogol",
            Column::OddsUnder25 => "odds_under_2.5",
            Column::OddsOver25 => "odds_over_2.5",
            Column::Vig1X2 => "1X2 Vig",
            Column::VigDc => "DC Vig",
            Column::VigGng => "G/NG Vig",
            Column::VigUo25 => "U/O 2.5 Vig",
        }
    }

    /// Read this column from a row.
    pub fn value(self, row: &OddsRow) -> f64 {
        let o = &row.odds;
        let m = &row.margins;
        match self {
            Column::Odds1 => o.one,
            Column::OddsX => o.draw,
            Column::Odds2 => o.two,
            Column::Odds1X => o.one_draw,
            Column::OddsX2 => o.draw_two,
            Column::Odds12 => o.one_two,
            Column::OddsGol => o.gol,
            Column::OddsNogol => o.nogol,
            Column::OddsUnder25 => o.under_2_5,
            Column::OddsOver25 => o.over_2_5,
            Column::Vig1X2 => m.one_x_two,
            Column::VigDc => m.double_chance,
            Column::VigGng => m.gol_nogol,
            Column::VigUo25 => m.under_over_2_5,
        }
    }
}

// ---------------------------------------------------------------------------
// BetType – one market, with its axes and margin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetType {
    OneXTwo,
    DoubleChance,
    GolNogol,
    UnderOver25,
}

impl BetType {
    pub const ALL: [BetType; 4] = [
        BetType::OneXTwo,
        BetType::DoubleChance,
        BetType::GolNogol,
        BetType::UnderOver25,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BetType::OneXTwo => "1X2",
            BetType::DoubleChance => "Doppia Chance",
            BetType::GolNogol => "Gol/Nogol",
            BetType::UnderOver25 => "Under/Over 2.5",
        }
    }

    /// Odds columns plotted on the chart axes, in x, y(, z) order.
    pub fn odds_columns(self) -> &'static [Column] {
        match self {
            BetType::OneXTwo => &[Column::Odds1, Column::OddsX, Column::Odds2],
            BetType::DoubleChance => &[Column::Odds1X, Column::OddsX2, Column::Odds12],
            BetType::GolNogol => &[Column::OddsGol, Column::OddsNogol],
            BetType::UnderOver25 => &[Column::OddsUnder25, Column::OddsOver25],
        }
    }

    pub fn margin_column(self) -> Column {
        match self {
            BetType::OneXTwo => Column::Vig1X2,
            BetType::DoubleChance => Column::VigDc,
            BetType::GolNogol => Column::VigGng,
            BetType::UnderOver25 => Column::VigUo25,
        }
    }

    pub fn timestamp_header(self) -> &'static str {
        match self {
            BetType::OneXTwo => "1X2 timestamp",
            BetType::DoubleChance => "DC timestamp",
            BetType::GolNogol => "G/NG timestamp",
            BetType::UnderOver25 => "U/O 2.5 timestamp",
        }
    }

    /// Two-outcome markets get a 2D scatter and the iso-margin overlay.
    pub fn is_two_way(self) -> bool {
        self.odds_columns().len() == 2
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// OddsRow – one cleaned row of the snapshot
// ---------------------------------------------------------------------------

/// Decimal odds of every market, rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOdds {
    pub one: f64,
    pub draw: f64,
    pub two: f64,
    pub one_draw: f64,
    pub draw_two: f64,
    pub one_two: f64,
    pub gol: f64,
    pub nogol: f64,
    pub under_2_5: f64,
    pub over_2_5: f64,
}

/// Bookmaker over-round per market, rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketMargins {
    pub one_x_two: f64,
    pub double_chance: f64,
    pub gol_nogol: f64,
    pub under_over_2_5: f64,
}

/// Per-market refresh timestamps (informational only).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketTimestamps {
    pub one_x_two: Option<String>,
    pub double_chance: Option<String>,
    pub gol_nogol: Option<String>,
    pub under_over_2_5: Option<String>,
}

impl MarketTimestamps {
    pub fn for_bet(&self, bet: BetType) -> Option<&str> {
        match bet {
            BetType::OneXTwo => self.one_x_two.as_deref(),
            BetType::DoubleChance => self.double_chance.as_deref(),
            BetType::GolNogol => self.gol_nogol.as_deref(),
            BetType::UnderOver25 => self.under_over_2_5.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OddsRow {
    pub home_team: String,
    pub away_team: String,
    pub prematch_url: String,
    /// Normalised competition tag; may be outside [`League::ALL`].
    pub league: String,
    pub hover_name: String,
    pub refreshed_at: String,
    pub refreshed_on: NaiveDate,
    pub odds: MarketOdds,
    pub margins: MarketMargins,
    pub timestamps: MarketTimestamps,
}

impl OddsRow {
    pub fn known_league(&self) -> Option<League> {
        League::from_tag(&self.league)
    }
}

// ---------------------------------------------------------------------------
// Snapshot – the cleaned table produced by one load
// ---------------------------------------------------------------------------

/// Row counts collected while cleaning the export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub records_read: usize,
    pub dropped_missing: usize,
    pub dropped_bad_timestamp: usize,
    pub dropped_bad_odds: usize,
    pub unmatched_league: usize,
}

impl LoadStats {
    pub fn dropped(&self) -> usize {
        self.dropped_missing + self.dropped_bad_timestamp + self.dropped_bad_odds
    }
}

/// Immutable result of one load cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub rows: Vec<OddsRow>,
    pub stats: LoadStats,
    /// Where the data came from (URL or file path).
    pub origin: String,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_tags_round_trip_through_lookup() {
        for league in League::ALL {
            assert_eq!(League::from_tag(league.tag()), Some(league));
        }
        assert_eq!(League::from_tag("SERIE_B"), None);
    }

    #[test]
    fn two_way_markets_have_two_axes() {
        assert!(BetType::GolNogol.is_two_way());
        assert!(BetType::UnderOver25.is_two_way());
        assert!(!BetType::OneXTwo.is_two_way());
        assert!(!BetType::DoubleChance.is_two_way());
        assert_eq!(BetType::DoubleChance.margin_column().header(), "DC Vig");
    }

    #[test]
    fn every_market_column_has_a_distinct_header() {
        let mut headers: Vec<&str> = Column::ODDS
            .iter()
            .chain(Column::MARGINS.iter())
            .map(|c| c.header())
            .collect();
        headers.sort_unstable();
        headers.dedup();
        assert_eq!(headers.len(), 14);
    }
}
