//! Output formatting for route search results.
//!
//! Routes are rendered either as a human-friendly text listing or as the
//! JSON serialization of the library result.

use std::io::{self, Write};

use clap::ValueEnum;
use starlane_lib::{PossibleRoutes, RouteFailure, RouteFindingResult, RoutingMetric};

use crate::terminal::ColorPalette;

/// Output format for the route command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable route listing.
    #[default]
    Text,
    /// Pretty-printed JSON of the full result.
    Json,
}

/// Write a search result in the requested format.
pub fn render_result<W: Write>(
    out: &mut W,
    result: &RouteFindingResult,
    format: OutputFormat,
    palette: &ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, result)?;
            writeln!(out)
        }
        OutputFormat::Text => match result {
            RouteFindingResult::Success(routes) => render_routes_text(out, routes, palette),
            RouteFindingResult::Failure(failure) => render_failure_text(out, failure, palette),
        },
    }
}

fn render_routes_text<W: Write>(
    out: &mut W,
    routes: &PossibleRoutes,
    palette: &ColorPalette,
) -> io::Result<()> {
    let noun = if routes.len() == 1 { "route" } else { "routes" };
    writeln!(
        out,
        "{}{}{} ({} {noun}):",
        palette.cyan,
        routes.label,
        palette.reset,
        routes.len()
    )?;
    for route in &routes.routes {
        writeln!(out)?;
        render_route_text(out, route, palette)?;
    }
    Ok(())
}

fn render_route_text<W: Write>(
    out: &mut W,
    route: &RoutingMetric,
    palette: &ColorPalette,
) -> io::Result<()> {
    let jumps = if route.segment_count == 1 { "jump" } else { "jumps" };
    writeln!(
        out,
        "#{} {:.2} ly, {} {jumps} {}",
        route.rank,
        route.total_length,
        route.segment_count,
        palette.swatch(route.descriptor.color)
    )?;

    let last = route.path.len().saturating_sub(1);
    for (index, name) in route.path.iter().enumerate() {
        let (tag, color) = match index {
            0 => ("STRT", palette.tag_start),
            i if i == last => ("GOAL", palette.tag_goal),
            _ => ("JUMP", palette.tag_jump),
        };
        write!(
            out,
            "  {color}{tag}{} {}{name}{}",
            palette.reset, palette.white_bold, palette.reset
        )?;
        if index > 0 {
            if let Some(length) = route.descriptor.segment_lengths.get(index - 1) {
                write!(out, " {}({length:.2} ly){}", palette.gray, palette.reset)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_failure_text<W: Write>(
    out: &mut W,
    failure: &RouteFailure,
    palette: &ColorPalette,
) -> io::Result<()> {
    let kind = serde_json::to_value(failure.kind)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", failure.kind));
    writeln!(
        out,
        "{}No route ({kind}):{} {}",
        palette.red, palette.reset, failure.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlane_lib::{DatasetId, RouteFinder, RouteFindingOptions, StarNode, StarPosition};

    fn result(destination: &str) -> RouteFindingResult {
        let stars = vec![
            StarNode::new(1, "A", StarPosition::new(0.0, 0.0, 0.0)),
            StarNode::new(2, "B", StarPosition::new(5.0, 0.0, 0.0)),
            StarNode::new(3, "C", StarPosition::new(10.0, 0.0, 0.0)),
        ];
        let options = RouteFindingOptions::new("A", destination, 0.0, 6.0, 2);
        RouteFinder::default().find_routes(&options, &stars, &DatasetId::new("test"))
    }

    fn render(result: &RouteFindingResult, format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        render_result(&mut buffer, result, format, &ColorPalette::plain()).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn text_lists_each_stop() {
        let text = render(&result("C"), OutputFormat::Text);
        assert!(text.starts_with("Route A to C (1 route):"));
        assert!(text.contains("#1 10.00 ly, 2 jumps #00ffff"));
        assert!(text.contains("  STRT A\n"));
        assert!(text.contains("  JUMP B (5.00 ly)\n"));
        assert!(text.contains("  GOAL C (5.00 ly)\n"));
    }

    #[test]
    fn text_reports_failure_kind() {
        let text = render(&result("Z"), OutputFormat::Text);
        assert!(text.starts_with("No route (validation): Destination star 'Z'"));
    }

    #[test]
    fn json_round_trips_through_serde_value() {
        let text = render(&result("C"), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["label"], "Route A to C");
        assert_eq!(value["dataset"], "test");
    }
}
