use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::ColorDimension;
use crate::data::filter::{LeagueFilter, MAX_LABEL_LENGTH, MIN_LABEL_LENGTH};
use crate::data::model::{BetType, League};
use crate::data::source::FileSource;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – sidebar controls
// ---------------------------------------------------------------------------

/// Render the left control panel ("Pannello Interattivo").
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Pannello Interattivo");
    ui.separator();

    let sel = &mut state.selections;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Competition ----
            ui.strong("Seleziona la competizione:");
            ui.radio_value(&mut sel.league, LeagueFilter::All, "ALL");
            for league in League::ALL {
                ui.radio_value(&mut sel.league, LeagueFilter::Only(league), league.tag());
            }
            ui.separator();

            // ---- Market ----
            ui.strong("Seleziona la scommessa:");
            let mut bet = sel.bet;
            for candidate in BetType::ALL {
                ui.radio_value(&mut bet, candidate, candidate.label());
            }
            sel.set_bet(bet);
            ui.separator();

            // ---- Colour-by selector ----
            ui.strong("Colora per:");
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(sel.color.label(sel.bet))
                .show_ui(ui, |ui: &mut Ui| {
                    for dim in ColorDimension::ALL {
                        ui.selectable_value(&mut sel.color, dim, dim.label(sel.bet));
                    }
                });
            ui.separator();

            // ---- Date floor ----
            ui.strong("Eventi refreshati a partire da:");
            ui.add(egui_extras::DatePickerButton::new(&mut sel.since));
            ui.separator();

            // ---- Labels ----
            ui.checkbox(&mut sel.show_labels, "Mostra nomi squadre nel grafico");
            ui.label("Abbreviazione nomi squadre (caratteri):");
            ui.add(egui::Slider::new(
                &mut sel.label_length,
                MIN_LABEL_LENGTH..=MAX_LABEL_LENGTH,
            ));
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Apri CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        if ui.button("⟳ Aggiorna").clicked() {
            state.refresh();
        }

        ui.separator();

        match state.snapshot() {
            Some(snap) => {
                ui.label(format!(
                    "{} eventi caricati da {} ({} scartati)",
                    snap.len(),
                    snap.origin,
                    snap.stats.dropped()
                ));
                if snap.stats.unmatched_league > 0 {
                    ui.label(
                        RichText::new(format!(
                            "{} senza competizione nota",
                            snap.stats.unmatched_league
                        ))
                        .color(Color32::YELLOW),
                    );
                }
            }
            None => {
                ui.label(format!("Nessun dato da {}", state.source_description()));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Apri export pre-match")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        let prefix = state.config.league_url_prefix.clone();
        state.set_source(Box::new(FileSource::new(path, prefix)));
    }
}
