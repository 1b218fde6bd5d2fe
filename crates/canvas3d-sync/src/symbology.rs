//! Style keys understood by the renderer's `setSymbology` command.

use canvas3d_protocol::Command;

use crate::layer::Style;

/// Marker colour of point layers.
pub const POINT_FILL: &str = "point_fill";
/// Stroke colour of lines and polygon outlines.
pub const STROKE_COLOR: &str = "stroke_color";
/// Diffuse material colour of surfaces.
pub const FILL_COLOR_DIFFUSE: &str = "fill_color_diffuse";

/// Style arguments derived from a layer's first symbol.
///
/// Returns an empty list when the layer has no style the renderer can use.
#[must_use]
pub fn style_args(style: Option<&Style>) -> Vec<(&'static str, String)> {
    match style {
        None => Vec::new(),
        Some(Style::Point { color }) => vec![(POINT_FILL, color.clone())],
        Some(Style::Line { color }) => vec![(STROKE_COLOR, color.clone())],
        Some(Style::Fill {
            color,
            border_color,
        }) => vec![
            (FILL_COLOR_DIFFUSE, color.clone()),
            (STROKE_COLOR, border_color.clone()),
        ],
        Some(Style::Colorize { color }) => vec![(FILL_COLOR_DIFFUSE, color.clone())],
    }
}

/// `setSymbology` for `object_id`, or `None` when nothing was derived.
#[must_use]
pub fn symbology_command(object_id: &str, style: Option<&Style>) -> Option<Command> {
    let args = style_args(style);
    if args.is_empty() {
        return None;
    }
    let mut command = Command::new(crate::commands::SET_SYMBOLOGY).arg("id", object_id);
    for (key, value) in args {
        command.insert(key, value);
    }
    Some(command)
}
