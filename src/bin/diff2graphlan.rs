use clap::Parser;
use log::{error, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bioannot_rs::cli::{ArgCheck, Diff2GraphlanArgs};
use bioannot_rs::files::{open_input, write_output};
use bioannot_rs::logging::init_logging;
use bioannot_rs::progress::spinner;
use bioannot_rs::taxtree::write_input_tree;
use bioannot_rs::{diff_to_graphlan, AnnotError};

fn run(args: &Diff2GraphlanArgs) -> Result<(), AnnotError> {
    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    // 1. Tree, colours and annotations
    let spinner_ = spinner("Building GraPhlAn annotations...", "blue");
    let input = open_input(args.input.as_deref())?;
    let results = diff_to_graphlan(&args.taxa_map, input, &args.to_config(), &mut rng)?;
    spinner_.finish_with_message("Annotations built.");

    // 2. Outputs
    let spinner_ = spinner("Writing output files...", "yellow");
    write_output(args.output.as_deref(), &results.get_annotation_text())?;
    write_input_tree(&args.tree_out, &results.clades)?;
    spinner_.finish_with_message("Output files created.");

    Ok(())
}

fn main() {
    init_logging();
    let start = std::time::Instant::now();

    let args = Diff2GraphlanArgs::parse();
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
