use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};

use crate::chart::contour::{build_overlay, ContourOverlay};
use crate::chart::projection::Camera;
use crate::chart::{build_chart, ChartSpec, ColorDimension};
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::{LeagueFilter, Table};
use crate::data::model::{BetType, Snapshot};
use crate::data::source::{HttpSource, SnapshotProvider, SnapshotSource};

// ---------------------------------------------------------------------------
// Sidebar selections
// ---------------------------------------------------------------------------

/// Everything the user can pick in the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub league: LeagueFilter,
    pub bet: BetType,
    pub color: ColorDimension,
    pub since: NaiveDate,
    pub show_labels: bool,
    pub label_length: usize,
}

impl Selections {
    pub fn new(config: &DashboardConfig, today: NaiveDate) -> Self {
        let since = today
            .checked_sub_days(Days::new(config.default_days_back.max(0) as u64))
            .unwrap_or(today);
        Self {
            league: LeagueFilter::All,
            bet: BetType::OneXTwo,
            color: ColorDimension::default_for(BetType::OneXTwo),
            since,
            show_labels: false,
            label_length: config.default_label_length,
        }
    }

    /// Switch market and colour by its margin.
    pub fn set_bet(&mut self, bet: BetType) {
        if self.bet != bet {
            self.bet = bet;
            self.color = ColorDimension::default_for(bet);
        }
    }
}

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Output of one recomputation pass.
pub struct View {
    pub table: Table,
    pub chart: ChartSpec,
    pub color_map: ColorMap,
    pub overlay: Option<ContourOverlay>,
}

impl View {
    pub fn build(snapshot: Arc<Snapshot>, sel: &Selections, config: &DashboardConfig) -> Self {
        let table = Table::build(snapshot, sel.league, sel.since, sel.label_length);
        let chart = build_chart(&table, sel.bet, sel.color, sel.show_labels);
        let color_map = ColorMap::for_chart(&chart);
        let overlay = build_overlay(&table, sel.bet, &config.contour);
        log::debug!(
            "view {} {}: {} rows, overlay: {}",
            sel.league,
            sel.bet,
            table.len(),
            overlay.is_some()
        );
        Self {
            table,
            chart,
            color_map,
            overlay,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    provider: SnapshotProvider,

    pub selections: Selections,

    /// 3D chart orientation.
    pub camera: Camera,

    /// Current view and the selections it was built from.
    view: Option<(Selections, View)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let source = HttpSource::new(
            config.source_url.clone(),
            config.league_url_prefix.clone(),
            Duration::from_secs(config.request_timeout_secs),
        );
        Self::with_source(config, Box::new(source))
    }

    pub fn with_source(config: DashboardConfig, source: Box<dyn SnapshotSource>) -> Self {
        let selections = Selections::new(&config, Local::now().date_naive());
        Self {
            config,
            provider: SnapshotProvider::new(source),
            selections,
            camera: Camera::default(),
            view: None,
            status_message: None,
        }
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.provider.cached()
    }

    pub fn source_description(&self) -> String {
        self.provider.describe()
    }

    /// Load the snapshot if this cache epoch has none yet.
    pub fn ensure_loaded(&mut self) {
        if self.provider.cached().is_some() {
            return;
        }
        match self.provider.snapshot() {
            Ok(_) => {
                self.view = None;
                self.status_message = None;
            }
            Err(e) => self.report(e),
        }
    }

    /// Drop the cached snapshot and fetch again. On failure the previous
    /// snapshot stays on screen.
    pub fn refresh(&mut self) {
        let previous = self.provider.cached();
        match self.provider.refresh() {
            Ok(_) => {
                self.view = None;
                self.status_message = None;
            }
            Err(e) => {
                self.report(e);
                if let Some(prev) = previous {
                    self.provider.restore(prev);
                }
            }
        }
    }

    /// Swap the data source (e.g. a local CSV) and load from it.
    pub fn set_source(&mut self, source: Box<dyn SnapshotSource>) {
        log::info!("Switching data source to {}", source.describe());
        self.provider = SnapshotProvider::new(source);
        self.view = None;
        self.ensure_loaded();
    }

    fn report(&mut self, err: crate::error::FetchError) {
        log::error!("Failed to load data: {err}");
        self.status_message = Some(format!("Error: {err}"));
    }

    /// View for the current selections, rebuilt only when they changed.
    pub fn view(&mut self) -> Option<&View> {
        let snapshot = self.provider.cached()?;
        let stale = match &self.view {
            Some((sel, view)) => {
                *sel != self.selections || !Arc::ptr_eq(view.table.snapshot(), &snapshot)
            }
            None => true,
        };
        if stale {
            let view = View::build(snapshot, &self.selections, &self.config);
            self.view = Some((self.selections.clone(), view));
        }
        self.view.as_ref().map(|(_, view)| view)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::config::ContourConfig;
    use crate::data::loader::parse_snapshot;
    use crate::data::loader::tests::{csv_of, line, PREFIX};
    use crate::data::model::League;
    use crate::error::{FetchError, Result};

    struct MemorySource {
        csv: Rc<Cell<Option<String>>>,
    }

    impl SnapshotSource for MemorySource {
        fn describe(&self) -> String {
            "memory".into()
        }

        fn fetch(&self) -> Result<Snapshot> {
            let csv = self.csv.take();
            self.csv.set(csv.clone());
            match csv {
                Some(csv) => parse_snapshot(csv.as_bytes(), PREFIX, "memory"),
                None => Err(FetchError::MissingColumn("home_team".into())),
            }
        }
    }

    fn state() -> (AppState, Rc<Cell<Option<String>>>) {
        let csv = Rc::new(Cell::new(Some(csv_of(&[
            line("Juventus", "Inter", "SERIE%20A", "2024-03-01 10:00:00.1", "1.80"),
            line("Sevilla", "Betis", "LIGA", "2024-03-02 10:00:00.1", "1.95"),
        ]))));
        let config = DashboardConfig {
            contour: ContourConfig {
                resolution: 40,
                ..ContourConfig::default()
            },
            ..DashboardConfig::default()
        };
        let mut state = AppState::with_source(
            config,
            Box::new(MemorySource {
                csv: Rc::clone(&csv),
            }),
        );
        state.selections.since = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (state, csv)
    }

    #[test]
    fn default_floor_is_two_days_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let sel = Selections::new(&DashboardConfig::default(), today);
        assert_eq!(sel.since, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        assert_eq!(sel.label_length, 3);
        assert_eq!(sel.league, LeagueFilter::All);
    }

    #[test]
    fn changing_bet_resets_color_to_its_margin() {
        let mut sel = Selections::new(&DashboardConfig::default(), NaiveDate::MIN);
        sel.color = ColorDimension::League;
        sel.set_bet(BetType::GolNogol);
        assert_eq!(sel.color, ColorDimension::VigGng);
    }

    #[test]
    fn view_follows_selections() {
        let (mut state, _) = state();
        state.ensure_loaded();
        assert_eq!(state.view().unwrap().table.len(), 2);
        assert!(state.view().unwrap().overlay.is_none());

        state.selections.league = LeagueFilter::Only(League::SerieA);
        state.selections.set_bet(BetType::UnderOver25);
        let view = state.view().unwrap();
        assert_eq!(view.table.len(), 1);
        assert_eq!(view.overlay.as_ref().unwrap().curves.len(), 7);
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let (mut state, csv) = state();
        state.ensure_loaded();
        let before = state.snapshot().unwrap();

        csv.set(None);
        state.refresh();
        assert!(state.status_message.is_some());
        assert!(Arc::ptr_eq(&state.snapshot().unwrap(), &before));
    }

    #[test]
    fn failed_first_load_reports_error() {
        let (mut state, csv) = state();
        csv.set(None);
        state.ensure_loaded();
        assert!(state.snapshot().is_none());
        assert!(state.view().is_none());
        assert!(state.status_message.unwrap().contains("home_team"));
    }
}
