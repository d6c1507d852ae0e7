use kd_cluster::data::{Point, PointSet};
use kd_cluster::error::Error;
use kd_cluster::tree::KdTree;

use log::{error, info};
use std::time::Instant;

use clap::Parser;
#[derive(Parser, Debug)] #[command(author, version, about, long_about = None)]
struct Args {

    //Input file, one comma-separated point per line
    input_filename: String,

    //Query point as a comma-separated tuple, e.g. 162,817,812
    target: Option<String>,

    //Number of neighbors to return
    #[arg(short = 'n', long = "count", default_value_t = 1)]
    n: usize,

    //Query a random point inside the bounds of the input instead of `target`
    #[arg(short, long, conflicts_with = "target")]
    random: bool,
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

    let points = PointSet::from_file(&args.input_filename)?;

    if points.is_empty() {
        return Err(Error::EmptyInput);
    }

    let start = Instant::now();
    let tree = KdTree::build(&points);
    info!("inserted {}/{} nodes in {:.6}s", tree.len(), points.len(), start.elapsed().as_secs_f64());

    let target = query_target(&args, &points)?;

    let start = Instant::now();
    let nn = tree.nearest(&target, args.n)?;
    info!("queried {} neighbors in {:.6}s", args.n, start.elapsed().as_secs_f64());

    match tree.contains(&target)? {
        true => println!("target: {} (indexed)", target),
        false => println!("target: {}", target),
    }
    for hit in nn.iter() {
        println!("{} {} distance^2 {}", hit.point, tree.point(hit.point), hit.distance);
    }

    Ok(())
}

fn query_target(args: &Args, points: &PointSet) -> Result<Point, Error> {

    match (&args.target, args.random) {
        (None, true) => Ok(random_target(points)),
        (Some(s), false) => Point::parse(s, 1),
        (Some(_), true) => Err(Error::Config("a target and --random cannot be combined".to_string())),
        (None, false) => Err(Error::Config("no target given, pass one or use --random".to_string())),
    }
}

fn random_target(points: &PointSet) -> Point {

    let low = points.points.iter().flat_map(|p| p.coords.iter()).min().copied().unwrap_or(0);
    let high = points.points.iter().flat_map(|p| p.coords.iter()).max().copied().unwrap_or(0);

    return Point::random(points.dim, low, high);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> PointSet {
        PointSet::parse("0,0,0\n5,0,0\n0,5,0\n").unwrap()
    }

    #[test]
    fn count_is_a_flag() {

        let args = Args::try_parse_from(["nearest", "points.txt", "--random", "-n", "5"]).unwrap();
        assert!(args.random);
        assert_eq!(args.target, None);
        assert_eq!(args.n, 5);

        let args = Args::try_parse_from(["nearest", "points.txt", "1,0,0", "--count", "2"]).unwrap();
        assert_eq!(args.target.as_deref(), Some("1,0,0"));
        assert_eq!(args.n, 2);
    }

    #[test]
    fn random_with_target_is_rejected() {

        assert!(Args::try_parse_from(["nearest", "points.txt", "--random", "5"]).is_err());

        let args = Args { input_filename: "points.txt".to_string(), target: Some("5".to_string()), n: 1, random: true };
        assert!(matches!(query_target(&args, &fixture()), Err(Error::Config(_))));
    }

    #[test]
    fn missing_target_is_rejected() {

        let args = Args::try_parse_from(["nearest", "points.txt"]).unwrap();
        assert!(matches!(query_target(&args, &fixture()), Err(Error::Config(_))));
    }

    #[test]
    fn random_target_stays_in_bounds() {

        let points = fixture();
        for _ in 0..50 {
            let target = random_target(&points);
            assert_eq!(target.dim(), 3);
            assert!(target.coords.iter().all(|c| *c >= 0 && *c <= 5));
        }
    }

    #[test]
    fn parsed_target_is_queried() {

        let args = Args::try_parse_from(["nearest", "points.txt", "1,0,0", "-n", "2"]).unwrap();
        let points = fixture();
        let target = query_target(&args, &points).unwrap();

        let tree = KdTree::build(&points);
        let nn = tree.nearest(&target, args.n).unwrap();
        assert_eq!(nn.iter().map(|h| h.point).collect::<Vec<_>>(), vec![0, 1]);
        assert!(!tree.contains(&target).unwrap());
        assert!(tree.contains(points.get(2)).unwrap());
    }
}
