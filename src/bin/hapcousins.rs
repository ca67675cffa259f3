use anyhow::Result;
use clap::Parser;

use hapcousins::{
    cli::{Cli, Commands, InputArgs, InspectArgs, SearchArgs},
    index::HapIndex,
    io::{self, json, tsv},
};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Search(args) => search(args),
        Commands::Inspect(args) => inspect(args),
    }
}

fn load(input: &InputArgs) -> Result<HapIndex> {
    io::load_index(input.mode, &input.input, input.word_size, input.map.as_deref())
}

fn search(args: &SearchArgs) -> Result<()> {
    let mut index = load(&args.input)?;
    let results = hapcousins::run(&mut index, args.k, args.tolerance, args.window_size)?;

    let stdout = std::io::stdout().lock();
    if args.json {
        json::write_cousins(stdout, &results)?;
    } else {
        tsv::write_cousins(stdout, &index, &results)?;
    }

    Ok(())
}

fn inspect(args: &InspectArgs) -> Result<()> {
    let mut index = load(&args.input)?;
    println!("{index}");

    for &hap_id in &args.hap {
        println!("{}", index.format_hap(hap_id)?);
    }
    if let Some(pair) = &args.diagram {
        println!("{}", index.match_diagram(pair[0], pair[1])?);
    }
    if args.hashes {
        for hap_id in 0..index.num_haps() {
            index.add_to_hash(hap_id)?;
        }
        println!("{}", index.format_hashes());
    }

    Ok(())
}
