use kd_cluster::cluster::PartitionKind;
use kd_cluster::config::SolverConfig;
use kd_cluster::data::PointSet;
use kd_cluster::error::Error;
use kd_cluster::report;

use log::{error, info};
use std::time::Instant;

use clap::Parser;
#[derive(Parser, Debug)] #[command(author, version, about, long_about = None)]
struct Args {

    //Input file, one comma-separated point per line
    input_filename: String,

    //Number of biggest groups to multiply
    nbiggest: Option<usize>,

    //Number of union steps, defaults to the number of points
    ndist: Option<usize>,

    //YAML file with solver settings, overridden by the other arguments
    #[arg(short, long)]
    config: Option<String>,

    //Group count to reduce to for the last joined pair
    #[arg(short = 'g', long)]
    ngroups: Option<usize>,

    //sorted | disjoint_set
    #[arg(short, long)]
    partition: Option<PartitionKind>,

    //Print the report as json
    #[arg(short, long)]
    json: bool,
}

fn main() {

    env_logger::init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => {},
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        },
    }
}

fn run(args: Args) -> Result<(), Error> {

    let mut config = match &args.config {
        Some(filename) => SolverConfig::from_file(filename)?,
        None => SolverConfig::default(),
    };

    if let Some(nbiggest) = args.nbiggest { config.nbiggest = nbiggest; }
    if let Some(ndist) = args.ndist { config.ndist = Some(ndist); }
    if let Some(ngroups) = args.ngroups { config.ngroups = ngroups; }
    if let Some(partition) = args.partition { config.partition = partition; }

    info!("{:?}", &config);

    let start = Instant::now();
    let points = PointSet::from_file(&args.input_filename)?;
    info!("read {} points of dimension {} from {} in {:.6}s",
        points.len(), points.dim, &args.input_filename, start.elapsed().as_secs_f64());

    let report = report::solve(&points, &config)?;

    match args.json {
        true => {
            let s = serde_json::to_string_pretty(&report).map_err(|e| Error::Config(e.to_string()))?;
            println!("{}", s);
        },
        false => print!("{}", report.pretty()),
    }

    Ok(())
}
