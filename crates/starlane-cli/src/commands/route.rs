//! Route command handler for finding ranked routes between two stars.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{debug, info};

use starlane_lib::{
    AlternateColorPolicy, DatasetId, RouteColor, RouteFinder, RouteFindingOptions,
    RouteFindingResult, RouteStyle, RoutingConfig, StarNode,
};

use crate::output::{render_result, OutputFormat};
use crate::terminal::ColorPalette;

/// Arguments for the route command.
#[derive(Args, Debug, Clone)]
pub struct RouteCommandArgs {
    /// JSON file holding an array of stars.
    #[arg(long, value_name = "FILE")]
    pub stars: PathBuf,
    /// Origin star name (case-sensitive).
    #[arg(long = "from")]
    pub from: String,
    /// Destination star name (case-sensitive).
    #[arg(long = "to")]
    pub to: String,
    /// Minimum jump length in light-years.
    #[arg(long, default_value_t = 0.0)]
    pub min_jump: f64,
    /// Maximum jump length in light-years.
    #[arg(long)]
    pub max_jump: f64,
    /// Number of alternative routes to find.
    #[arg(long, short = 'k', default_value_t = 3)]
    pub paths: usize,
    /// Spectral class letter to exclude (repeatable).
    #[arg(long = "exclude-class", value_name = "LETTER")]
    pub exclude_class: Vec<String>,
    /// Affiliation tag to exclude (repeatable).
    #[arg(long = "exclude-affiliation", value_name = "TAG")]
    pub exclude_affiliation: Vec<String>,
    /// Colour of the shortest route as `#rrggbb`.
    #[arg(long, value_parser = parse_color)]
    pub color: Option<RouteColor>,
    /// Line width recorded on every route.
    #[arg(long, default_value_t = 0.5)]
    pub line_width: f64,
    /// Seed for reproducible random colours on alternate routes.
    #[arg(long)]
    pub color_seed: Option<u64>,
    /// Dataset label carried into the output. Defaults to the file stem.
    #[arg(long)]
    pub dataset: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl RouteCommandArgs {
    /// Convert CLI args to library search options.
    pub fn to_options(&self) -> RouteFindingOptions {
        let mut style = RouteStyle::default();
        if let Some(color) = self.color {
            style.color = color;
        }
        style.line_width = self.line_width;

        let mut options = RouteFindingOptions::new(
            self.from.clone(),
            self.to.clone(),
            self.min_jump,
            self.max_jump,
            self.paths,
        )
        .with_style(style);
        options.category_exclusions.extend(self.exclude_class.iter().cloned());
        options
            .affiliation_exclusions
            .extend(self.exclude_affiliation.iter().cloned());
        options
    }

    /// Dataset label for the star file.
    pub fn dataset_id(&self) -> DatasetId {
        match &self.dataset {
            Some(label) => DatasetId::new(label.clone()),
            None => DatasetId::new(
                self.stars
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut RoutingConfig) {
        if let Some(seed) = self.color_seed {
            config.alternate_colors = AlternateColorPolicy::Seeded(seed);
        }
    }
}

fn parse_color(text: &str) -> std::result::Result<RouteColor, String> {
    RouteColor::from_hex(text).ok_or_else(|| format!("'{text}' is not a #rrggbb colour"))
}

/// Read a JSON array of stars.
pub fn load_stars(path: &Path) -> Result<Vec<StarNode>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read stars from {}", path.display()))?;
    let stars: Vec<StarNode> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse stars from {}", path.display()))?;
    debug!(path = %path.display(), stars = stars.len(), "loaded star list");
    Ok(stars)
}

/// Handle the route subcommand.
///
/// Prints the ranked routes and fails with the search's message when no
/// route could be produced.
pub fn handle_route_command(args: &RouteCommandArgs, mut config: RoutingConfig) -> Result<()> {
    args.apply_to(&mut config);
    let stars = load_stars(&args.stars)?;
    let dataset = args.dataset_id();
    info!(dataset = %dataset, stars = stars.len(), "route command started");

    let finder = RouteFinder::new(config);
    let result = finder.find_routes(&args.to_options(), &stars, &dataset);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match (&result, args.format) {
        (RouteFindingResult::Failure(failure), OutputFormat::Text) => {
            bail!("{}", failure.message);
        }
        _ => render_result(&mut out, &result, args.format, &ColorPalette::detect())
            .context("failed to write routes")?,
    }
    out.flush().context("failed to flush output")?;

    if let Some(failure) = result.failure() {
        bail!("{}", failure.message);
    }
    Ok(())
}
