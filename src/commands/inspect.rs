use anyhow::Result;

use crate::cli::{Cli, InspectArgs};
use crate::filter;
use crate::search;
use crate::session::Session;

pub fn run(cli: &Cli, args: &InspectArgs) -> Result<()> {
    if cli.verbose > 0 {
        eprintln!(
            "[inspect] oae={} snv={}",
            args.oae.display(),
            args.snv.display()
        );
    }

    let pair = Session::new().load(&args.oae, &args.snv)?;
    if cli.verbose > 0 {
        eprintln!(
            "[inspect] loaded {} segments, {} structures ({})",
            pair.segments.len(),
            pair.structures.len(),
            pair.crs
        );
    }

    if let Some(term) = &args.search {
        let suggestions = search::search_structures(term, &pair.structures);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        } else {
            for suggestion in &suggestions {
                println!("{}", suggestion.label);
            }
        }
        return Ok(());
    }

    let state = args.filters.to_state();
    let outcome = filter::apply(&pair, &state);
    let report = outcome.report();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Rodovias visíveis: {}", report.segment_count);
    println!("Obras visíveis: {}", report.structure_count);
    if report.empty {
        println!("Nenhum dado encontrado com os filtros selecionados.");
    }
    if cli.verbose > 0 {
        println!("UF: {}", report.options.regions.join(", "));
        println!("Tipo de obra: {}", report.options.categories.join(", "));
        println!("Rodovia: {}", report.options.routes.join(", "));
        println!("Tipo de conflito: {}", report.options.conflicts.join(", "));
        println!("Código SGO: {}", report.options.codes.join(", "));
    }
    Ok(())
}
