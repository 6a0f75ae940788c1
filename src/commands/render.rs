use anyhow::Result;

use crate::cli::{Cli, RenderArgs};
use crate::common::fs::write_atomic;
use crate::filter;
use crate::io::geojson;
use crate::session::Session;

pub fn run(cli: &Cli, args: &RenderArgs) -> Result<()> {
    if cli.verbose > 0 {
        eprintln!(
            "[render] oae={} snv={} -> {}",
            args.oae.display(),
            args.snv.display(),
            args.out.display()
        );
    }

    let pair = Session::new().load(&args.oae, &args.snv)?;
    let state = args.filters.to_state();
    let outcome = filter::apply(&pair, &state);

    if outcome.is_empty() {
        eprintln!("Nenhum dado encontrado com os filtros selecionados.");
        return Ok(());
    }

    let segments = serde_json::to_vec_pretty(&geojson::segments_to_geojson(&outcome))?;
    let structures = serde_json::to_vec_pretty(&geojson::structures_to_geojson(&outcome))?;
    write_atomic(&args.out.join("segments.geojson"), &segments, args.force)?;
    write_atomic(&args.out.join("structures.geojson"), &structures, args.force)?;

    println!(
        "Wrote {} segments, {} structures -> {}",
        outcome.segment_count(),
        outcome.structure_count(),
        args.out.display()
    );
    Ok(())
}
