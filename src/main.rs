use clap::Parser;
use log::debug;
use scdasm::config::{self, DumpConfig};
use scdasm::rdt;
use scdasm::{render_units, Disassembly, ScdError};
use std::path::PathBuf;

/// Disassemble the scripts stored in a Biohazard 2 room (.rdt) file
#[derive(Parser, Debug)]
#[command(name = "scdasm", version, about, long_about = None)]
struct Args {
    /// Room container to read
    input: PathBuf,

    /// Print the header counts and offset table
    #[arg(long)]
    info: bool,

    /// Print unit names with their instruction counts
    #[arg(long)]
    list: bool,

    /// Print only this unit (e.g. init.scd, sub3.scd)
    #[arg(long, value_name = "NAME")]
    unit: Option<String>,

    /// Write every unit and a project.toml into DIR
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Prefix lines with program counters
    #[arg(short = 'n', long)]
    addresses: bool,

    /// Skip the hex listing
    #[arg(long)]
    no_hex: bool,

    /// Skip the call listing
    #[arg(long)]
    no_code: bool,

    /// Dump settings file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args) {
        eprintln!("scdasm: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ScdError> {
    let mut dump = match &args.config {
        Some(path) => DumpConfig::load(path)?,
        None => DumpConfig::default(),
    };
    if args.addresses {
        dump.show_addresses = true;
    }
    if args.no_hex {
        dump.dump_hex = false;
    }
    if args.no_code {
        dump.dump_code = false;
    }
    if args.output.is_some() {
        dump.output_dir = args.output.clone();
    }
    dump.validate()?;
    debug!("dump settings: {:?}", dump);

    if args.info {
        let (header, offsets) = rdt::read_tables_file(&args.input)?;
        print!("{}", rdt::describe(&header, &offsets));
        return Ok(());
    }

    let rdt = scdasm::load_file(&args.input)?;
    let disassembly = Disassembly::new(&rdt);

    if args.list {
        print!("{}", disassembly.listing());
        return Ok(());
    }

    if let Some(dir) = &dump.output_dir {
        config::write_units(&rdt, &disassembly, &dump, dir, Some(args.input.as_path()))?;
        return Ok(());
    }

    let units = disassembly.select(args.unit.as_deref())?;
    print!("{}", render_units(&units, &dump.output_options())?);

    Ok(())
}
