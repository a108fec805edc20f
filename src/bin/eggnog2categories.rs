use clap::Parser;
use log::{error, info};

use bioannot_rs::cli::{ArgCheck, EggnogArgs};
use bioannot_rs::files::write_output;
use bioannot_rs::logging::init_logging;
use bioannot_rs::progress::spinner;
use bioannot_rs::{eggnog_categories, rows_to_text, AnnotError};

fn run(args: &EggnogArgs) -> Result<(), AnnotError> {
    let spinner_ = spinner("Assigning NOGs to functional category descriptions...", "cyan");
    let rows = eggnog_categories(&args.functions, &args.nogs)?;
    spinner_.finish_with_message("NOGs assigned.");

    write_output(args.output.as_deref(), &rows_to_text(&rows))
}

fn main() {
    init_logging();
    let start = std::time::Instant::now();

    let args = EggnogArgs::parse();
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
