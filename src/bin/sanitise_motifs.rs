use clap::Parser;
use log::{error, info};

use bioannot_rs::cli::{ArgCheck, SanitiseMotifsArgs};
use bioannot_rs::files::{open_input, write_output};
use bioannot_rs::logging::init_logging;
use bioannot_rs::progress::spinner;
use bioannot_rs::{rows_to_text, sanitise_motifs, AnnotError};

fn run(args: &SanitiseMotifsArgs) -> Result<(), AnnotError> {
    let spinner_ = spinner("Removing redundant motif gene sets...", "green");
    let results = sanitise_motifs(open_input(args.input.as_deref())?)?;
    spinner_.finish_with_message("Motif gene sets sanitised.");

    write_output(args.output.as_deref(), &rows_to_text(&results.rows()))?;
    results.summary.log();
    Ok(())
}

fn main() {
    init_logging();
    let start = std::time::Instant::now();

    let args = SanitiseMotifsArgs::parse();
    args.check().unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    run(&args).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    info!("Elapsed time: {:?}", start.elapsed());
}
