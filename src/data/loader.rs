use std::io::Read;

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::model::{
    Column, LoadStats, MarketMargins, MarketOdds, MarketTimestamps, OddsRow, Snapshot,
};
use crate::error::{FetchError, Result};

/// Format of `refreshed_at`; the fractional part is optional when parsing.
pub const REFRESHED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const TEXT_COLUMNS: [&str; 4] = ["home_team", "away_team", "prematch_url", "refreshed_at"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse a pre-match export into a cleaned [`Snapshot`].
///
/// The header must carry every text, odds and margin column. Rows with
/// missing or unparsable values are dropped and counted in [`LoadStats`];
/// short records count as missing values. Only an unreadable CSV or a
/// missing header fails the whole load.
pub fn parse_snapshot<R: Read>(input: R, url_prefix: &str, origin: &str) -> Result<Snapshot> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    check_headers(reader.headers()?)?;

    let mut stats = LoadStats::default();
    let mut rows = Vec::new();

    for result in reader.deserialize::<RawRecord>() {
        let record = result?;
        stats.records_read += 1;

        match clean_record(record, url_prefix) {
            Ok(row) => {
                if row.known_league().is_none() {
                    stats.unmatched_league += 1;
                    log::debug!("unmatched league '{}' for {}", row.league, row.prematch_url);
                }
                rows.push(row);
            }
            Err(DropReason::Missing(column)) => {
                log::debug!("dropping row {}: missing {column}", stats.records_read);
                stats.dropped_missing += 1;
            }
            Err(DropReason::BadTimestamp(raw)) => {
                log::debug!("dropping row {}: unparsable refreshed_at '{raw}'", stats.records_read);
                stats.dropped_bad_timestamp += 1;
            }
            Err(DropReason::BadOdds(column)) => {
                log::debug!("dropping row {}: {column} not above 1.0", stats.records_read);
                stats.dropped_bad_odds += 1;
            }
        }
    }

    log::info!(
        "Loaded {} of {} rows from {origin} ({} dropped)",
        rows.len(),
        stats.records_read,
        stats.dropped()
    );
    if stats.unmatched_league > 0 {
        log::warn!(
            "{} rows have a competition outside the known leagues and are only visible under ALL",
            stats.unmatched_league
        );
    }

    Ok(Snapshot {
        rows,
        stats,
        origin: origin.to_string(),
    })
}

fn check_headers(headers: &csv::StringRecord) -> Result<()> {
    let required = TEXT_COLUMNS
        .iter()
        .copied()
        .chain(Column::ODDS.iter().map(|c| c.header()))
        .chain(Column::MARGINS.iter().map(|c| c.header()));
    for name in required {
        if !headers.iter().any(|h| h == name) {
            return Err(FetchError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Derived columns
// ---------------------------------------------------------------------------

/// Competition tag: first path segment after `prefix`, with encoded or literal
/// spaces turned into underscores.
pub fn league_from_url(url: &str, prefix: &str) -> String {
    let tail = url.replace(prefix, "");
    let segment = tail.split('/').next().unwrap_or("");
    segment.replace("%20", "_").replace(' ', "_")
}

pub fn hover_name(home: &str, away: &str) -> String {
    format!("{home}-{away}")
}

/// Round to 2 decimals, ties to even on the scaled value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

// ---------------------------------------------------------------------------
// Row cleaning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum DropReason {
    Missing(&'static str),
    BadTimestamp(String),
    BadOdds(&'static str),
}

/// One CSV record as exported. Unparsable or absent numbers deserialize to `None`.
#[derive(Debug, Deserialize)]
struct RawRecord {
    home_team: Option<String>,
    away_team: Option<String>,
    prematch_url: Option<String>,
    refreshed_at: Option<String>,

    #[serde(rename = "odds_1", deserialize_with = "csv::invalid_option", default)]
    odds_1: Option<f64>,
    #[serde(rename = "odds_X", deserialize_with = "csv::invalid_option", default)]
    odds_x: Option<f64>,
    #[serde(rename = "odds_2", deserialize_with = "csv::invalid_option", default)]
    odds_2: Option<f64>,
    #[serde(rename = "odds_1X", deserialize_with = "csv::invalid_option", default)]
    odds_1x: Option<f64>,
    #[serde(rename = "odds_X2", deserialize_with = "csv::invalid_option", default)]
    odds_x2: Option<f64>,
    #[serde(rename = "odds_12", deserialize_with = "csv::invalid_option", default)]
    odds_12: Option<f64>,
    #[serde(rename = "odds_gol", deserialize_with = "csv::invalid_option", default)]
    odds_gol: Option<f64>,
    #[serde(rename = "odds_nogol", deserialize_with = "csv::invalid_option", default)]
    odds_nogol: Option<f64>,
    #[serde(rename = "odds_under_2.5", deserialize_with = "csv::invalid_option", default)]
    odds_under: Option<f64>,
    #[serde(rename = "odds_over_2.5", deserialize_with = "csv::invalid_option", default)]
    odds_over: Option<f64>,

    #[serde(rename = "1X2 Vig", deserialize_with = "csv::invalid_option", default)]
    vig_1x2: Option<f64>,
    #[serde(rename = "DC Vig", deserialize_with = "csv::invalid_option", default)]
    vig_dc: Option<f64>,
    #[serde(rename = "G/NG Vig", deserialize_with = "csv::invalid_option", default)]
    vig_gng: Option<f64>,
    #[serde(rename = "U/O 2.5 Vig", deserialize_with = "csv::invalid_option", default)]
    vig_uo: Option<f64>,

    #[serde(rename = "1X2 timestamp", default)]
    ts_1x2: Option<String>,
    #[serde(rename = "DC timestamp", default)]
    ts_dc: Option<String>,
    #[serde(rename = "G/NG timestamp", default)]
    ts_gng: Option<String>,
    #[serde(rename = "U/O 2.5 timestamp", default)]
    ts_uo: Option<String>,
}

fn text(value: Option<String>, name: &'static str) -> std::result::Result<String, DropReason> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(DropReason::Missing(name)),
    }
}

fn number(value: Option<f64>, name: &'static str) -> std::result::Result<f64, DropReason> {
    match value {
        Some(v) if v.is_finite() => Ok(round2(v)),
        _ => Err(DropReason::Missing(name)),
    }
}

fn decimal_odds(value: Option<f64>, name: &'static str) -> std::result::Result<f64, DropReason> {
    let v = number(value, name)?;
    if v > 1.0 {
        Ok(v)
    } else {
        Err(DropReason::BadOdds(name))
    }
}

fn clean_record(rec: RawRecord, url_prefix: &str) -> std::result::Result<OddsRow, DropReason> {
    let home_team = text(rec.home_team, "home_team")?;
    let away_team = text(rec.away_team, "away_team")?;
    let prematch_url = text(rec.prematch_url, "prematch_url")?;
    let refreshed_at = text(rec.refreshed_at, "refreshed_at")?;

    let margins = MarketMargins {
        one_x_two: number(rec.vig_1x2, "1X2 Vig")?,
        double_chance: number(rec.vig_dc, "DC Vig")?,
        gol_nogol: number(rec.vig_gng, "G/NG Vig")?,
        under_over_2_5: number(rec.vig_uo, "U/O 2.5 Vig")?,
    };
    let odds = MarketOdds {
        one: decimal_odds(rec.odds_1, "odds_1")?,
        draw: decimal_odds(rec.odds_x, "odds_X")?,
        two: decimal_odds(rec.odds_2, "odds_2")?,
        one_draw: decimal_odds(rec.odds_1x, "odds_1X")?,
        draw_two: decimal_odds(rec.odds_x2, "odds_X2")?,
        one_two: decimal_odds(rec.odds_12, "odds_12")?,
        gol: decimal_odds(rec.odds_gol, "odds_gol")?,
        nogol: decimal_odds(rec.odds_nogol, "odds_nogol")?,
        under_2_5: decimal_odds(rec.odds_under, "odds_under_2.5")?,
        over_2_5: decimal_odds(rec.odds_over, "odds_over_2.5")?,
    };

    let refreshed_on = NaiveDateTime::parse_from_str(refreshed_at.trim(), REFRESHED_AT_FORMAT)
        .map_err(|_| DropReason::BadTimestamp(refreshed_at.clone()))?
        .date();

    Ok(OddsRow {
        league: league_from_url(&prematch_url, url_prefix),
        hover_name: hover_name(&home_team, &away_team),
        home_team,
        away_team,
        prematch_url,
        refreshed_at,
        refreshed_on,
        odds,
        margins,
        timestamps: MarketTimestamps {
            one_x_two: rec.ts_1x2,
            double_chance: rec.ts_dc,
            gol_nogol: rec.ts_gng,
            under_over_2_5: rec.ts_uo,
        },
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::model::League;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    pub const PREFIX: &str = "https://www.snai.it/sport/CALCIO/";

    pub const HEADER: &str = "home_team,away_team,prematch_url,refreshed_at,\
odds_1,odds_X,odds_2,1X2 Vig,1X2 timestamp,\
odds_1X,odds_X2,odds_12,DC Vig,DC timestamp,\
odds_gol,odds_nogol,G/NG Vig,G/NG timestamp,\
odds_under_2.5,odds_over_2.5,U/O 2.5 Vig,U/O 2.5 timestamp";

    /// Build one CSV line with plausible odds; `league` is the raw URL segment.
    pub fn line(home: &str, away: &str, league: &str, refreshed_at: &str, gol: &str) -> String {
        format!(
            "{home},{away},https://www.snai.it/sport/CALCIO/{league}/{home}/{away},{refreshed_at},\
2.104,3.2,3.5,5.123,{refreshed_at},\
1.3,1.7,1.25,6.0,{refreshed_at},\
{gol},1.9,7.25,{refreshed_at},\
2.05,1.75,5.9,{refreshed_at}"
        )
    }

    pub fn csv_of(lines: &[String]) -> String {
        let mut out = String::from(HEADER);
        for l in lines {
            out.push('\n');
            out.push_str(l);
        }
        out.push('\n');
        out
    }

    fn parse(csv: &str) -> Snapshot {
        parse_snapshot(csv.as_bytes(), PREFIX, "test").unwrap()
    }

    #[test]
    fn league_from_url_handles_literal_space() {
        assert_eq!(
            league_from_url("https://www.snai.it/sport/CALCIO/SERIE A/x/y", PREFIX),
            "SERIE_A"
        );
    }

    #[test]
    fn league_from_url_handles_percent_encoding() {
        assert_eq!(
            league_from_url("https://www.snai.it/sport/CALCIO/PREMIER%20LEAGUE/a/b", PREFIX),
            "PREMIER_LEAGUE"
        );
    }

    #[test]
    fn league_from_url_malformed_does_not_panic() {
        let tag = league_from_url("not a url", PREFIX);
        assert_eq!(tag, "not_a_url");
        assert_eq!(League::from_tag(&tag), None);
        assert_eq!(league_from_url("", PREFIX), "");
    }

    #[test]
    fn round2_uses_ties_to_even() {
        assert_relative_eq!(round2(2.125), 2.12);
        assert_relative_eq!(round2(2.375), 2.38);
        assert_relative_eq!(round2(1.999), 2.0);
        assert_relative_eq!(round2(3.14159), 3.14);
    }

    #[test]
    fn parses_and_derives_columns() {
        let csv = csv_of(&[line(
            "Juventus",
            "Inter",
            "SERIE%20A",
            "2024-03-01 12:30:45.123456",
            "1.857",
        )]);
        let snap = parse(&csv);
        assert_eq!(snap.len(), 1);
        let row = &snap.rows[0];
        assert_eq!(row.league, "SERIE_A");
        assert_eq!(row.known_league(), Some(League::SerieA));
        assert_eq!(row.hover_name, "Juventus-Inter");
        assert_eq!(row.refreshed_on, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_relative_eq!(row.odds.one, 2.1);
        assert_relative_eq!(row.odds.gol, 1.86);
        assert_relative_eq!(row.margins.one_x_two, 5.12);
        assert_eq!(row.timestamps.gol_nogol.as_deref(), Some("2024-03-01 12:30:45.123456"));
    }

    #[test]
    fn drops_rows_with_missing_or_bad_values() {
        let csv = csv_of(&[
            line("A", "B", "LIGA", "2024-03-01 10:00:00.000001", "1.80"),
            line("C", "D", "LIGA", "2024-03-01 10:00:00.000001", ""),
            line("E", "F", "LIGA", "yesterday", "1.80"),
            line("G", "H", "LIGA", "2024-03-01 10:00:00.000001", "1.001"),
            line("I", "J", "LIGA", "2024-03-01 10:00:00.000001", "n/a"),
            line("", "K", "LIGA", "2024-03-01 10:00:00.000001", "1.80"),
        ]);
        let snap = parse(&csv);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.rows[0].home_team, "A");
        assert_eq!(snap.stats.records_read, 6);
        assert_eq!(snap.stats.dropped_missing, 3);
        assert_eq!(snap.stats.dropped_bad_timestamp, 1);
        assert_eq!(snap.stats.dropped_bad_odds, 1);
    }

    #[test]
    fn surviving_odds_are_rounded_and_above_one() {
        let csv = csv_of(&[
            line("A", "B", "LIGA", "2024-03-01 10:00:00.5", "1.333333"),
            line("C", "D", "BUNDESLIGA", "2024-03-02 11:00:00.25", "2.71828"),
        ]);
        let snap = parse(&csv);
        assert_eq!(snap.len(), 2);
        for row in &snap.rows {
            for col in Column::ODDS {
                let v = col.value(row);
                assert!(v > 1.0, "{} = {v}", col.header());
                assert_relative_eq!(v, (v * 100.0).round() / 100.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn unmatched_league_is_kept_and_counted() {
        let csv = csv_of(&[line("A", "B", "SERIE%20B", "2024-03-01 10:00:00.1", "1.8")]);
        let snap = parse(&csv);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.rows[0].league, "SERIE_B");
        assert_eq!(snap.stats.unmatched_league, 1);
    }

    #[test]
    fn missing_header_is_an_error() {
        let csv = "home_team,away_team,prematch_url,refreshed_at\nA,B,u,2024-01-01 00:00:00.0\n";
        let err = parse_snapshot(csv.as_bytes(), PREFIX, "test").unwrap_err();
        assert!(matches!(err, FetchError::MissingColumn(ref c) if c == "odds_1"));
    }

    #[test]
    fn short_record_is_dropped_not_fatal() {
        let mut csv = csv_of(&[line("A", "B", "LIGA", "2024-03-01 10:00:00.1", "1.8")]);
        csv.push_str("only,three,fields\n");
        let snap = parse(&csv);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.rows[0].home_team, "A");
        assert_eq!(snap.stats.records_read, 2);
        assert_eq!(snap.stats.dropped_missing, 1);
    }

    #[test]
    fn missing_trailing_timestamp_keeps_the_row() {
        let full = line("C", "D", "LIGA", "2024-03-01 10:00:00.1", "1.8");
        let (short, _) = full.rsplit_once(',').unwrap();
        let csv = csv_of(&[line("A", "B", "LIGA", "2024-03-01 10:00:00.1", "1.8"), short.to_string()]);
        let snap = parse(&csv);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.stats.dropped(), 0);
        assert_eq!(snap.rows[1].timestamps.under_over_2_5, None);
        assert!(snap.rows[1].timestamps.gol_nogol.is_some());
    }
}
