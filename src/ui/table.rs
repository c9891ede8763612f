use eframe::egui::Ui;
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::filter::Table;
use crate::data::model::BetType;

// ---------------------------------------------------------------------------
// Filtered data table
// ---------------------------------------------------------------------------

/// Headers shown for a market: teams, date, the market's odds and margin, and
/// its refresh timestamp.
pub fn headers(bet: BetType) -> Vec<&'static str> {
    let mut headers = vec!["home_team", "away_team", "refreshed_on"];
    headers.extend(bet.odds_columns().iter().map(|c| c.header()));
    headers.push(bet.margin_column().header());
    headers.push(bet.timestamp_header());
    headers
}

pub fn odds_table(ui: &mut Ui, table: &Table, bet: BetType) {
    if table.is_empty() {
        ui.label("Nessun evento per la selezione corrente.");
        return;
    }

    let headers = headers(bet);
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(260.0)
        .columns(TableColumn::auto(), headers.len())
        .header(20.0, |mut header| {
            for name in &headers {
                header.col(|ui| {
                    ui.strong(*name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.len(), |mut row| {
                let Some(view) = table.get(row.index()) else {
                    return;
                };
                let r = view.row;
                row.col(|ui| {
                    ui.label(&r.home_team);
                });
                row.col(|ui| {
                    ui.label(&r.away_team);
                });
                row.col(|ui| {
                    ui.label(r.refreshed_on.to_string())
                        .on_hover_text(&r.refreshed_at);
                });
                for col in bet.odds_columns() {
                    row.col(|ui| {
                        ui.label(format!("{:.2}", col.value(r)));
                    });
                }
                row.col(|ui| {
                    ui.label(format!("{:.2}", bet.margin_column().value(r)));
                });
                row.col(|ui| {
                    ui.label(r.timestamps.for_bet(bet).unwrap_or("–"));
                });
            });
        });
}
