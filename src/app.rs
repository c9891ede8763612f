use eframe::egui::{self, ScrollArea, Ui};

use crate::chart::ChartKind;
use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ScommesseApp {
    pub state: AppState,
}

impl ScommesseApp {
    /// Build the app and load the first snapshot.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.ensure_loaded();
        Self { state }
    }
}

impl eframe::App for ScommesseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: table and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| central_panel(ui, &mut self.state));
        });
    }
}

fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dashboard scommesse");
    let sel = state.selections.clone();
    ui.label(format!("{} {}", sel.league, sel.bet));

    if !sel.bet.is_two_way() {
        plot::camera_controls(ui, &mut state.camera);
    }
    let camera = state.camera;

    let Some(view) = state.view() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Nessun dato caricato  (File → Apri CSV… oppure ⟳ Aggiorna)");
        });
        return;
    };

    table::odds_table(ui, &view.table, sel.bet);
    ui.separator();

    let kind = match view.chart.kind {
        ChartKind::Scatter2d => "2D",
        ChartKind::Scatter3d => "3D",
    };
    let labels = if view.chart.text_binding.is_some() {
        " con etichette"
    } else {
        ""
    };
    ui.strong(format!("{} – grafico {kind}{labels}", view.chart.title));
    plot::primary_chart(ui, &view.chart, &view.color_map, camera);

    if let Some(overlay) = &view.overlay {
        ui.separator();
        plot::contour_chart(ui, overlay);
    }
}
