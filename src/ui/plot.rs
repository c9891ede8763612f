use eframe::egui::{self, Align2, Color32, RichText, Ui};
use egui_plot::{Legend, Line, LineStyle, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::chart::contour::{two_way_margin, ContourOverlay};
use crate::chart::projection::{Camera, UnitCube};
use crate::chart::{ChartKind, ChartSpec};
use crate::color::ColorMap;

const PLOT_HEIGHT: f32 = 420.0;
const POINT_RADIUS: f32 = 4.0;

// ---------------------------------------------------------------------------
// Primary scatter
// ---------------------------------------------------------------------------

/// Render the market scatter described by `spec`.
pub fn primary_chart(ui: &mut Ui, spec: &ChartSpec, color_map: &ColorMap, camera: Camera) {
    if spec.is_empty() {
        ui.label("Nessun punto da mostrare.");
        return;
    }
    match spec.kind {
        ChartKind::Scatter2d => scatter_2d(ui, spec, color_map),
        ChartKind::Scatter3d => scatter_3d(ui, spec, color_map, camera),
    }
    color_legend(ui, &spec.color_label, color_map);
}

fn scatter_2d(ui: &mut Ui, spec: &ChartSpec, color_map: &ColorMap) {
    Plot::new("primary_chart")
        .height(PLOT_HEIGHT)
        .x_axis_label(spec.axes[0].header())
        .y_axis_label(spec.axes[1].header())
        .label_formatter(|name, value| {
            if name.is_empty() {
                format!("{:.2}, {:.2}", value.x, value.y)
            } else {
                format!("{name}\n{:.2}, {:.2}", value.x, value.y)
            }
        })
        .show(ui, |plot_ui| {
            for p in &spec.points {
                let (x, y) = (p.coords[0], p.coords[1]);
                plot_ui.points(
                    Points::new(vec![[x, y]])
                        .name(&p.hover)
                        .color(color_map.color_for(&p.color))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(POINT_RADIUS),
                );
                if let Some(text) = &p.text {
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), RichText::new(text).size(11.0))
                            .anchor(Align2::LEFT_BOTTOM),
                    );
                }
            }
        });
}

fn scatter_3d(ui: &mut Ui, spec: &ChartSpec, color_map: &ColorMap, camera: Camera) {
    let Some(cube) = UnitCube::fit(spec.points.iter().map(|p| p.coords.as_slice())) else {
        return;
    };

    Plot::new("primary_chart_3d")
        .height(PLOT_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .label_formatter(|name, _| name.to_string())
        .show(ui, |plot_ui| {
            // axis triad from the cube's min corner
            let origin = camera.project([0.0, 0.0, 0.0]);
            for (k, axis) in spec.axes.iter().enumerate() {
                let mut end = [0.0; 3];
                end[k] = 1.0;
                let tip = camera.project(end);
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![origin, tip]))
                        .color(Color32::GRAY)
                        .width(1.0),
                );
                let label = format!("{} ({:.2}–{:.2})", axis.header(), cube.min(k), cube.max(k));
                plot_ui.text(
                    Text::new(PlotPoint::new(tip[0], tip[1]), RichText::new(label).size(11.0))
                        .color(Color32::GRAY),
                );
            }

            for p in &spec.points {
                let [sx, sy] = camera.project(cube.normalise(&p.coords));
                let coords: Vec<String> = p.coords.iter().map(|v| format!("{v:.2}")).collect();
                plot_ui.points(
                    Points::new(vec![[sx, sy]])
                        .name(format!("{}\n({})", p.hover, coords.join(", ")))
                        .color(color_map.color_for(&p.color))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(POINT_RADIUS),
                );
                if let Some(text) = &p.text {
                    plot_ui.text(
                        Text::new(PlotPoint::new(sx, sy), RichText::new(text).size(11.0))
                            .anchor(Align2::LEFT_BOTTOM),
                    );
                }
            }
        });
}

/// Camera sliders for the 3D scatter.
pub fn camera_controls(ui: &mut Ui, camera: &mut Camera) {
    ui.horizontal(|ui: &mut Ui| {
        ui.add(egui::Slider::new(&mut camera.yaw, -180.0..=180.0).text("rotazione"));
        ui.add(egui::Slider::new(&mut camera.pitch, -90.0..=90.0).text("inclinazione"));
        if ui.small_button("Reset").clicked() {
            *camera = Camera::default();
        }
    });
}

fn color_legend(ui: &mut Ui, label: &str, color_map: &ColorMap) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.strong(label);
        for (text, color) in color_map.legend_entries(6) {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, color);
            ui.label(text);
        }
    });
}

// ---------------------------------------------------------------------------
// Secondary chart: iso-margin curves
// ---------------------------------------------------------------------------

/// Dashed iso-margin curves over the observed odds pairs.
pub fn contour_chart(ui: &mut Ui, overlay: &ContourOverlay) {
    ui.strong(format!("Curve iso-margine {}", overlay.bet));
    let b = overlay.bounds;

    Plot::new("contour_chart")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(overlay.x.header())
        .y_axis_label(overlay.y.header())
        .include_x(b.x_min)
        .include_x(b.x_max)
        .include_y(b.y_min)
        .include_y(b.y_max)
        .label_formatter(|_, value| {
            format!(
                "{:.2}, {:.2}\nvig {:.2}%",
                value.x,
                value.y,
                two_way_margin(value.x, value.y) * 100.0
            )
        })
        .show(ui, |plot_ui| {
            let n = overlay.curves.len().max(2);
            for (k, curve) in overlay.curves.iter().enumerate() {
                let color = crate::color::plasma(k as f64 / (n - 1) as f64);
                let name = format!("vig {:.0}%", curve.margin * 100.0);
                for polyline in &curve.polylines {
                    plot_ui.line(
                        Line::new(PlotPoints::from(polyline.clone()))
                            .name(&name)
                            .color(color)
                            .style(LineStyle::dashed_loose())
                            .width(1.5),
                    );
                }
            }
            plot_ui.points(
                Points::new(overlay.points.clone())
                    .color(Color32::LIGHT_GRAY)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(3.0),
            );
        });
}
