//! Writes a synthetic pre-match export for offline use with "Apri CSV…".
//!
//! Usage: `generate_sample [OUTPUT]` (default `prematch_sample.csv`).

use anyhow::{Context, Result};
use chrono::{Duration, Local};
use serde::Serialize;

const URL_PREFIX: &str = "https://www.snai.it/sport/CALCIO/";

const LEAGUES: [(&str, [&str; 6]); 4] = [
    ("SERIE%20A", ["Juventus", "Inter", "Milan", "Napoli", "Roma", "Lazio"]),
    ("LIGA", ["Real Madrid", "Barcelona", "Atletico", "Sevilla", "Betis", "Valencia"]),
    ("PREMIER%20LEAGUE", ["Arsenal", "Chelsea", "Liverpool", "Everton", "Fulham", "Brentford"]),
    ("BUNDESLIGA", ["Bayern", "Dortmund", "Leipzig", "Freiburg", "Mainz", "Bochum"]),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

#[derive(Serialize)]
struct ExportRow {
    home_team: String,
    away_team: String,
    prematch_url: String,
    refreshed_at: String,
    odds_1: f64,
    #[serde(rename = "odds_X")]
    odds_x: f64,
    odds_2: f64,
    #[serde(rename = "1X2 Vig")]
    vig_1x2: f64,
    #[serde(rename = "1X2 timestamp")]
    ts_1x2: String,
    #[serde(rename = "odds_1X")]
    odds_1x: f64,
    #[serde(rename = "odds_X2")]
    odds_x2: f64,
    odds_12: f64,
    #[serde(rename = "DC Vig")]
    vig_dc: f64,
    #[serde(rename = "DC timestamp")]
    ts_dc: String,
    odds_gol: f64,
    odds_nogol: f64,
    #[serde(rename = "G/NG Vig")]
    vig_gng: f64,
    #[serde(rename = "G/NG timestamp")]
    ts_gng: String,
    #[serde(rename = "odds_under_2.5")]
    odds_under: f64,
    #[serde(rename = "odds_over_2.5")]
    odds_over: f64,
    #[serde(rename = "U/O 2.5 Vig")]
    vig_uo: f64,
    #[serde(rename = "U/O 2.5 timestamp")]
    ts_uo: String,
}

/// Quote every outcome at `1 / (p · (1 + margin))`, floored at 1.01.
fn quote(probs: &[f64], margin: f64) -> Vec<f64> {
    probs
        .iter()
        .map(|p| (1.0 / (p * (1.0 + margin))).max(1.01))
        .collect()
}

/// Over-round in percent. `book` is what the fair probabilities sum to: 2 for
/// double chance, where every outcome is covered twice.
fn vig_percent(odds: &[f64], book: f64) -> f64 {
    (odds.iter().map(|o| 1.0 / o).sum::<f64>() / book - 1.0) * 100.0
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "prematch_sample.csv".to_string());
    let mut rng = SimpleRng::new(42);
    let now = Local::now().naive_local();

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut rows = 0usize;
    for (league, teams) in LEAGUES {
        for (h, home) in teams.iter().enumerate() {
            for (a, away) in teams.iter().enumerate() {
                if h == a || rng.next_f64() < 0.6 {
                    continue;
                }

                let refreshed = now - Duration::minutes((rng.next_f64() * 5.0 * 24.0 * 60.0) as i64);
                let refreshed_at = refreshed.format("%Y-%m-%d %H:%M:%S%.6f").to_string();

                // 1X2: home advantage skews towards "1"
                let w1 = rng.uniform(0.8, 2.2);
                let wx = rng.uniform(0.7, 1.0);
                let w2 = rng.uniform(0.5, 1.8);
                let total = w1 + wx + w2;
                let (p1, px, p2) = (w1 / total, wx / total, w2 / total);
                let m1x2 = rng.uniform(0.04, 0.09);
                let o1x2 = quote(&[p1, px, p2], m1x2);

                let odc = quote(&[p1 + px, px + p2, p1 + p2], rng.uniform(0.03, 0.08));

                let p_gol = rng.uniform(0.4, 0.65);
                let ogng = quote(&[p_gol, 1.0 - p_gol], rng.uniform(0.04, 0.10));

                let p_under = rng.uniform(0.35, 0.6);
                let ouo = quote(&[p_under, 1.0 - p_under], rng.uniform(0.04, 0.10));

                writer.serialize(ExportRow {
                    home_team: home.to_string(),
                    away_team: away.to_string(),
                    prematch_url: format!(
                        "{URL_PREFIX}{league}/{}/{}",
                        home.replace(' ', "%20"),
                        away.replace(' ', "%20")
                    ),
                    refreshed_at: refreshed_at.clone(),
                    odds_1: o1x2[0],
                    odds_x: o1x2[1],
                    odds_2: o1x2[2],
                    vig_1x2: vig_percent(&o1x2, 1.0),
                    ts_1x2: refreshed_at.clone(),
                    odds_1x: odc[0],
                    odds_x2: odc[1],
                    odds_12: odc[2],
                    vig_dc: vig_percent(&odc, 2.0),
                    ts_dc: refreshed_at.clone(),
                    odds_gol: ogng[0],
                    odds_nogol: ogng[1],
                    vig_gng: vig_percent(&ogng, 1.0),
                    ts_gng: refreshed_at.clone(),
                    odds_under: ouo[0],
                    odds_over: ouo[1],
                    vig_uo: vig_percent(&ouo, 1.0),
                    ts_uo: refreshed_at,
                })?;
                rows += 1;
            }
        }
    }
    writer.flush().with_context(|| format!("flushing {output_path}"))?;

    println!("Wrote {rows} pre-match events to {output_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn double_chance_vig_is_on_the_same_scale() {
        let (p1, px, p2) = (0.5, 0.3, 0.2);
        let three_way = quote(&[p1, px, p2], 0.06);
        let double = quote(&[p1 + px, px + p2, p1 + p2], 0.06);
        assert_relative_eq!(vig_percent(&three_way, 1.0), 6.0, epsilon = 1e-9);
        assert_relative_eq!(vig_percent(&double, 2.0), 6.0, epsilon = 1e-9);
    }
}
