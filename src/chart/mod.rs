//! Chart layer: turns a filtered [`Table`] into declarative chart inputs.
//!
//! Nothing here draws; `ui::plot` renders a [`ChartSpec`] and a
//! [`contour::ContourOverlay`] with egui_plot.

pub mod contour;
pub mod projection;

use crate::data::filter::Table;
use crate::data::model::{BetType, Column, OddsRow};

pub const TEXT_BINDING: &str = "text_name";

// ---------------------------------------------------------------------------
// Color dimension
// ---------------------------------------------------------------------------

/// What the point colour encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorDimension {
    Vig1X2,
    VigDc,
    VigGng,
    VigUo25,
    /// First odds axis of the selected market.
    FirstOdds,
    /// Second odds axis of the selected market.
    SecondOdds,
    League,
}

impl ColorDimension {
    pub const ALL: [ColorDimension; 7] = [
        ColorDimension::Vig1X2,
        ColorDimension::VigDc,
        ColorDimension::VigGng,
        ColorDimension::VigUo25,
        ColorDimension::FirstOdds,
        ColorDimension::SecondOdds,
        ColorDimension::League,
    ];

    /// The market's own margin, which is what a fresh selection colours by.
    pub fn default_for(bet: BetType) -> Self {
        match bet {
            BetType::OneXTwo => ColorDimension::Vig1X2,
            BetType::DoubleChance => ColorDimension::VigDc,
            BetType::GolNogol => ColorDimension::VigGng,
            BetType::UnderOver25 => ColorDimension::VigUo25,
        }
    }

    /// Numeric column behind this dimension, `None` for the league.
    pub fn column(self, bet: BetType) -> Option<Column> {
        match self {
            ColorDimension::Vig1X2 => Some(Column::Vig1X2),
            ColorDimension::VigDc => Some(Column::VigDc),
            ColorDimension::VigGng => Some(Column::VigGng),
            ColorDimension::VigUo25 => Some(Column::VigUo25),
            ColorDimension::FirstOdds => Some(bet.odds_columns()[0]),
            ColorDimension::SecondOdds => Some(bet.odds_columns()[1]),
            ColorDimension::League => None,
        }
    }

    pub fn label(self, bet: BetType) -> String {
        match self.column(bet) {
            Some(col) => col.header().to_string(),
            None => "league".to_string(),
        }
    }

    pub fn value(self, row: &OddsRow, bet: BetType) -> ColorValue {
        match self.column(bet) {
            Some(col) => ColorValue::Numeric(col.value(row)),
            None => ColorValue::Category(row.league.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    Numeric(f64),
    Category(String),
}

// ---------------------------------------------------------------------------
// ChartSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Scatter2d,
    Scatter3d,
}

/// One plotted market, with coordinates in axis order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub coords: Vec<f64>,
    pub color: ColorValue,
    pub hover: String,
    pub text: Option<String>,
}

/// Declarative description of the primary chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub bet: BetType,
    pub axes: Vec<Column>,
    pub color: ColorDimension,
    pub color_label: String,
    /// Column used for point text, set only when labels are shown.
    pub text_binding: Option<&'static str>,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Build the scatter for `bet`: 3D for the three-way markets, 2D otherwise.
pub fn build_chart(
    table: &Table,
    bet: BetType,
    color: ColorDimension,
    show_labels: bool,
) -> ChartSpec {
    let axes = bet.odds_columns().to_vec();
    let kind = if axes.len() == 3 {
        ChartKind::Scatter3d
    } else {
        ChartKind::Scatter2d
    };

    let points = table
        .rows()
        .map(|view| ChartPoint {
            coords: axes.iter().map(|c| c.value(view.row)).collect(),
            color: color.value(view.row, bet),
            hover: view.row.hover_name.clone(),
            text: show_labels.then(|| view.text_name.to_string()),
        })
        .collect();

    ChartSpec {
        kind,
        title: bet.label().to_string(),
        bet,
        axes,
        color,
        color_label: color.label(bet),
        text_binding: show_labels.then_some(TEXT_BINDING),
        points,
    }
}
