use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::filter::FilterState;
use crate::types::{RouteCode, StructureCode};

/// OAE/SNV map pipeline CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "oaemap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load both datasets, apply filters, and print counts + option domains
    Inspect(InspectArgs),

    /// Load both datasets, apply filters, and write GeoJSON map layers
    Render(RenderArgs),
}

/// Cascading filter selections, in stage order.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Federative unit (repeatable; none selects all)
    #[arg(long = "uf")]
    pub uf: Vec<String>,

    /// Structure category (tipo_obra); omit for all
    #[arg(long = "tipo-obra")]
    pub tipo_obra: Option<String>,

    /// Federal route code; zero-padded on input, so "5" matches "005"
    #[arg(long = "br")]
    pub br: Option<String>,

    /// Conflict tag (repeatable; none selects all)
    #[arg(long = "conflito")]
    pub conflito: Vec<String>,

    /// Structure code; zero-padded on input (repeatable; none selects all)
    #[arg(long = "cod-sgo")]
    pub cod_sgo: Vec<String>,
}

impl FilterArgs {
    pub fn to_state(&self) -> FilterState {
        FilterState {
            regions: self.uf.iter().map(|v| v.trim().to_string()).collect(),
            // "Todos" is the explicit select-all sentinel of both
            // single-choice stages.
            category: self.tipo_obra.clone().filter(|c| c != "Todos"),
            route: self
                .br
                .as_deref()
                .filter(|v| *v != "Todos")
                .map(RouteCode::parse),
            conflicts: self.conflito.iter().map(|v| v.trim().to_string()).collect(),
            codes: self.cod_sgo.iter().map(|v| StructureCode::parse(v)).collect(),
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Structure inventory table (CSV)
    #[arg(value_hint = ValueHint::FilePath)]
    pub oae: PathBuf,

    /// Zipped SNV shapefile
    #[arg(value_hint = ValueHint::FilePath)]
    pub snv: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Emit machine-readable JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Print typeahead suggestions for this term and exit
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Structure inventory table (CSV)
    #[arg(value_hint = ValueHint::FilePath)]
    pub oae: PathBuf,

    /// Zipped SNV shapefile
    #[arg(value_hint = ValueHint::FilePath)]
    pub snv: PathBuf,

    /// Output directory for segments.geojson / structures.geojson
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub out: PathBuf,

    /// Overwrite existing output files
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub filters: FilterArgs,
}
