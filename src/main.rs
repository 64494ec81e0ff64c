use anyhow::{anyhow, Context, Result};
use clap::{arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use league_schedule::ga::{GaConfig, GaRunner};
use league_schedule::models::{Penalties, Weights};
use league_schedule::parser::parse_file;
use league_schedule::scheduler::{ScheduleKpi, ScheduleReport};
use league_schedule::validation::validate_instance;

const NUMERIC_ARGS: [&str; 8] = [
    "W_MIN_FILLED",
    "W_PREF",
    "W_PAIR",
    "W_SEC_DIFF",
    "PEN_GAME_MIN",
    "PEN_PRACTICE_MIN",
    "PEN_NOT_PAIRED",
    "PEN_SECTION",
];

fn cli() -> Command {
    Command::new("league-schedule")
        .about("Assigns league games and practices to time slots")
        .arg_required_else_help(true)
        .allow_negative_numbers(true)
        .arg(arg!(<FILE> "Input file").value_parser(clap::value_parser!(PathBuf)))
        .arg(arg!(<W_MIN_FILLED> "Weight of slot minimum fill").value_parser(clap::value_parser!(i64)))
        .arg(arg!(<W_PREF> "Weight of unmet preferences").value_parser(clap::value_parser!(i64)))
        .arg(arg!(<W_PAIR> "Weight of separated pairs").value_parser(clap::value_parser!(i64)))
        .arg(
            arg!(<W_SEC_DIFF> "Weight of overlapping sections")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            arg!(<PEN_GAME_MIN> "Penalty per missing game in a slot")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            arg!(<PEN_PRACTICE_MIN> "Penalty per missing practice in a slot")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            arg!(<PEN_NOT_PAIRED> "Penalty per separated pair")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            arg!(<PEN_SECTION> "Penalty per overlapping section pair")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(arg!(--seed [SEED] "RNG seed").value_parser(clap::value_parser!(u64)))
        .arg(
            arg!(--"min-population" [N] "Population size that enables crossover and mutation")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"max-population" [N] "Population size that triggers eviction")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"eviction-batch" [N] "Schedules evicted per overflow")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"plateau-rounds" [N] "Eviction rounds before stopping")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(arg!(--json "Print the schedule as JSON"))
        .arg(arg!(--kpi "Print evaluation components to stderr"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    if let Err(e) = run(&matches) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("FILE")
        .ok_or_else(|| anyhow!("missing input file"))?;

    let mut numbers = [0i64; 8];
    for (value, name) in numbers.iter_mut().zip(NUMERIC_ARGS) {
        *value = *matches
            .get_one::<i64>(name)
            .ok_or_else(|| anyhow!("missing {}", name))?;
    }
    let [w_min, w_pref, w_pair, w_sec, pen_game, pen_practice, pen_pair, pen_section] = numbers;
    let weights = Weights::new(w_min, w_pref, w_pair, w_sec);
    let penalties = Penalties::new(pen_game, pen_practice, pen_pair, pen_section);

    let instance = parse_file(path, weights, penalties)
        .with_context(|| format!("cannot load {}", path.display()))?;

    if let Err(errors) = validate_instance(&instance) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(anyhow!(
            "instance has no valid schedule:\n  {}",
            messages.join("\n  ")
        ));
    }

    let config = build_config(matches);
    let result = GaRunner::run(&instance, &config)?;

    let report = ScheduleReport::from_schedule(&result.best);
    if matches.get_flag("json") {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report);
    }

    if matches.get_flag("kpi") {
        let kpi = ScheduleKpi::calculate(&result.best);
        eprintln!("{}", serde_json::to_string_pretty(&kpi)?);
    }
    Ok(())
}

fn build_config(matches: &ArgMatches) -> GaConfig {
    let mut config = GaConfig::default();
    let min = matches.get_one::<usize>("min-population").copied();
    let max = matches.get_one::<usize>("max-population").copied();
    if min.is_some() || max.is_some() {
        let min = min.unwrap_or(config.min_population);
        let max = max.unwrap_or(config.max_population);
        // Evict down to the minimum unless a batch is given
        config = config
            .with_population(min, max)
            .with_eviction_batch((max + 1).saturating_sub(min));
    }
    if let Some(&batch) = matches.get_one::<usize>("eviction-batch") {
        config = config.with_eviction_batch(batch);
    }
    if let Some(&rounds) = matches.get_one::<usize>("plateau-rounds") {
        config = config.with_plateau_rounds(rounds);
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config = config.with_seed(seed);
    }
    config
}
