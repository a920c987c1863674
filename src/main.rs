use anyhow::{anyhow, Context, Result};
use clap::{arg, value_parser, ArgMatches, Command};
use std::path::PathBuf;
use tracing::Level;
use u_atsp::ga::{AtspConfig, AtspRunner, FitnessPolicy, Population};
use u_atsp::instance::tsplib::load_tsplib;
use u_atsp::report::ConsoleReporter;
use u_numflow::random::create_rng;

fn cli() -> Command {
    Command::new("u-atsp")
        .about("Searches for a low-cost ATSP tour with a steady-state genetic algorithm")
        .arg_required_else_help(true)
        .arg(
            arg!(<INSTANCE> "Path to a TSPLIB instance (EXPLICIT, FULL_MATRIX)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--generations [N] "Number of generations")
                .default_value("1000")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--population [N] "Population size")
                .default_value("10")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--children [K] "Children bred and individuals replaced per generation")
                .default_value("1")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--"mutation-rate" [P] "Probability of swap mutation per child")
                .default_value("0.02")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            arg!(--policy [POLICY] "Fitness policy")
                .default_value("cost-inverse")
                .value_parser(["cost-inverse", "ratio"]),
        )
        .arg(arg!(--seed [SEED] "Random seed").value_parser(value_parser!(u64)))
        .arg(
            arg!(--"time-limit-ms" [MS] "Stop after this many milliseconds")
                .value_parser(value_parser!(u64)),
        )
        .arg(arg!(--"every-generation" "Print the best tour after every generation"))
        .arg(arg!(-v --verbose "Log every generation"))
}

fn config_from(matches: &ArgMatches) -> Result<AtspConfig> {
    let policy = match matches.get_one::<String>("policy").map(String::as_str) {
        Some("ratio") => FitnessPolicy::Ratio,
        _ => FitnessPolicy::CostInverse,
    };

    let mut config = AtspConfig::default()
        .with_max_generations(*matches.get_one::<usize>("generations").unwrap())
        .with_population_size(*matches.get_one::<usize>("population").unwrap())
        .with_children_per_generation(*matches.get_one::<usize>("children").unwrap())
        .with_fitness_policy(policy);
    // Not clamped: out-of-range rates must fail validation.
    config.mutation_rate = *matches.get_one::<f64>("mutation-rate").unwrap();
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config = config.with_seed(seed);
    }
    if let Some(&ms) = matches.get_one::<u64>("time-limit-ms") {
        config = config.with_time_limit_ms(ms);
    }

    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}

/// Random starting tours.
///
/// A fixed seed is offset by one so the shuffle stream never replays the
/// stream the runner draws from `config.seed`.
fn initial_population(config: &AtspConfig, n: usize) -> Population {
    let seed = match config.seed {
        Some(seed) => seed.wrapping_add(1),
        None => rand::random(),
    };
    let mut rng = create_rng(seed);
    Population::random(config.population_size, n, &mut rng)
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    tracing_subscriber::fmt()
        .with_max_level(if matches.get_flag("verbose") {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let path = matches.get_one::<PathBuf>("INSTANCE").unwrap();
    let instance = load_tsplib(path)
        .with_context(|| format!("failed to load instance {}", path.display()))?;
    let config = config_from(&matches)?;

    let population = initial_population(&config, instance.size());

    let mut reporter =
        ConsoleReporter::stdout().with_every_generation(matches.get_flag("every-generation"));
    AtspRunner::run_with_reporter(&instance, population, &config, None, &mut reporter);
    reporter.finish().context("failed to write report")?;

    Ok(())
}
