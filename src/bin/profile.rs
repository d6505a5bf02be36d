//! Loads random pairs into a dominance index and times queries against it.

use std::time::{Duration, Instant};

use clap::Parser;
use fnv::FnvHashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dominance::DominanceIndex;

#[derive(Parser, Debug)]
#[command(name = "profile", about = "times dominance index loading, queries and removal")]
struct Args {
    /// Pairs inserted per wave.
    #[arg(long, default_value_t = 10_000)]
    batch: usize,

    /// Waves loaded in each round.
    #[arg(long, default_value_t = 10)]
    waves: usize,

    /// Rounds of loading, querying and removing.
    #[arg(long, default_value_t = 5)]
    rounds: usize,

    /// Coordinates are drawn from `0 .. range`.
    #[arg(long, default_value_t = 1_000_000, value_parser = clap::value_parser!(u64).range(1..))]
    range: u64,

    /// Queries issued per round, for each query kind.
    #[arg(long, default_value_t = 10_000)]
    queries: usize,

    /// Seed for the pair and query generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Check every answer against a brute-force scan (slow).
    #[arg(long)]
    verify: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_tracing(args: &Args) {
    let fallback = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {

    let args = Args::parse();
    init_tracing(&args);
    info!(?args, "starting");

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut index = DominanceIndex::new();
    let mut oracle: FnvHashMap<(u64, u64), usize> = FnvHashMap::default();
    let mut loaded = Vec::new();

    for round in 0 .. args.rounds {

        let timer = Instant::now();
        for _wave in 0 .. args.waves {
            for _ in 0 .. args.batch {
                let pair = (rng.gen_range(0..args.range), rng.gen_range(0..args.range));
                if let Err(error) = index.insert(pair.0, pair.1) {
                    eprintln!("insert failed after {} pairs: {}", index.len(), error);
                    std::process::exit(1);
                }
                loaded.push(pair);
                if args.verify {
                    *oracle.entry(pair).or_insert(0) += 1;
                }
            }
        }
        let inserts = args.waves * args.batch;
        report(round, "insert", inserts, timer.elapsed(), index.len());

        let queries = (0 .. args.queries)
            .map(|_| (rng.gen_range(0..args.range), rng.gen_range(0..args.range)))
            .collect::<Vec<_>>();

        let timer = Instant::now();
        let mut found = 0;
        for &(a, b) in &queries {
            if index.exists_dominating(a, b) {
                found += 1;
            }
        }
        report(round, "exists", queries.len(), timer.elapsed(), found);

        let timer = Instant::now();
        let mut answers = Vec::with_capacity(queries.len());
        for &(a, b) in &queries {
            answers.push(index.min_volume_dominating(a, b));
        }
        let found = answers.iter().filter(|x| x.is_some()).count();
        report(round, "min-volume", queries.len(), timer.elapsed(), found);

        if args.verify {
            for (&(a, b), answer) in queries.iter().zip(answers.iter()) {
                let expected = brute_force(&oracle, a, b);
                assert_eq!(*answer, expected, "min volume for ({}, {})", a, b);
                assert_eq!(index.exists_dominating(a, b), expected.is_some(), "exists for ({}, {})", a, b);
            }
            if let Err(error) = index.check_invariants() {
                panic!("round {}: {}", round, error);
            }
            println!("\tround {}: verified {} queries", round, queries.len());
        }

        // remove a quarter of what is loaded, in random order.
        let timer = Instant::now();
        let removals = loaded.len() / 4;
        for _ in 0 .. removals {
            let (a, b) = loaded.swap_remove(rng.gen_range(0..loaded.len()));
            assert!(index.remove(a, b), "({}, {}) went missing", a, b);
            if args.verify {
                let count = oracle.get_mut(&(a, b)).map(|count| { *count -= 1; *count });
                if count == Some(0) {
                    oracle.remove(&(a, b));
                }
            }
        }
        report(round, "remove", removals, timer.elapsed(), index.len());
    }

    assert_eq!(index.len(), loaded.len());
}

fn report(round: usize, operation: &str, count: usize, elapsed: Duration, result: usize) {
    let rate = (count as f64) / elapsed.as_secs_f64().max(1e-9);
    println!("round {}: {:>10}: {:?} ({:.*} ops/sec, result {})", round, operation, elapsed, 2, rate, result);
}

// the least (volume, a, b) among stored pairs dominating (a, b).
fn brute_force(oracle: &FnvHashMap<(u64, u64), usize>, a: u64, b: u64) -> Option<(u64, u64)> {
    oracle.keys()
        .filter(|&&(x, y)| x >= a && y >= b)
        .min_by_key(|&&(x, y)| (u128::from(x) * u128::from(y), x, y))
        .cloned()
}
