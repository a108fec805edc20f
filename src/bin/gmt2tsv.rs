use clap::Parser;
use log::{error, info};

use bioannot_rs::cli::{ArgCheck, GmtArgs};
use bioannot_rs::files::{open_input, write_output};
use bioannot_rs::logging::init_logging;
use bioannot_rs::progress::spinner;
use bioannot_rs::{gmt_to_tsv, rows_to_text, AnnotError};

fn run(args: &GmtArgs) -> Result<(), AnnotError> {
    let spinner_ = spinner("Converting gene sets...", "green");
    let gmt = open_input(args.input.as_deref())?;
    let converted = gmt_to_tsv(gmt, &args.ontology, args.active_filter())?;
    spinner_.finish_with_message("Gene sets converted.");

    write_output(args.output.as_deref(), &rows_to_text(&converted.rows))
}

fn main() {
    init_logging();
    let start = std::time::Instant::now();

    let args = GmtArgs::parse();
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
