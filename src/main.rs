use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use fatigue_miner::curve::{CurveParams, StressType};
use fatigue_miner::history::HistoryConfig;

mod app_logic;

fn cli() -> Command {
    Command::new("fatigue-miner")
        .version("0.1.0")
        .about("Rainflow counting and Palmgren-Miner fatigue damage for detail categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("damage")
                .about("Run the assessment described by a YAML or TOML configuration")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to the configuration file")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("cycles")
                .about("Print the rainflow cycle table of a history file as CSV")
                .arg(Arg::new("input").short('i').long("input").help("History file").required(true))
                .arg(
                    Arg::new("column")
                        .long("column")
                        .value_parser(value_parser!(usize))
                        .default_value("0"),
                )
                .arg(Arg::new("delimiter").long("delimiter").default_value(","))
                .arg(
                    Arg::new("header")
                        .long("header")
                        .help("Number of leading lines to skip")
                        .value_parser(value_parser!(usize))
                        .default_value("0"),
                )
                .arg(Arg::new("scale").long("scale").value_parser(value_parser!(f64)).default_value("1")),
        )
        .subcommand(
            Command::new("endurance")
                .about("Evaluate the S-N curve at one or more stress ranges")
                .arg(
                    Arg::new("range")
                        .long("range")
                        .num_args(1..)
                        .value_parser(value_parser!(f64))
                        .required(true),
                )
                .arg(
                    Arg::new("detail-category")
                        .long("detail-category")
                        .value_parser(value_parser!(f64))
                        .required(true),
                )
                .arg(Arg::new("stress-type").long("stress-type").default_value("DIRECT"))
                .arg(Arg::new("m1").long("m1").value_parser(value_parser!(f64)).default_value("3"))
                .arg(Arg::new("m2").long("m2").value_parser(value_parser!(f64)).default_value("5"))
                .arg(Arg::new("m-shear").long("m-shear").value_parser(value_parser!(f64)).default_value("5")),
        )
}

fn arg<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, name: &str) -> Result<&'a T> {
    matches.get_one::<T>(name).ok_or_else(|| anyhow!("missing argument --{}", name))
}

fn dispatch(matches: &ArgMatches) -> Result<String> {
    match matches.subcommand() {
        Some(("damage", sub)) => app_logic::run(arg::<String>(sub, "config")?),
        Some(("cycles", sub)) => {
            let mut history = HistoryConfig::new(arg::<String>(sub, "input")?);
            history.column = *arg::<usize>(sub, "column")?;
            history.delimiter = arg::<String>(sub, "delimiter")?.clone();
            history.header = *arg::<usize>(sub, "header")?;
            history.scale = *arg::<f64>(sub, "scale")?;
            app_logic::run_cycles(&history)
        }
        Some(("endurance", sub)) => {
            let ranges: Vec<f64> = sub.get_many::<f64>("range").into_iter().flatten().copied().collect();
            let params = CurveParams {
                stress_type: arg::<String>(sub, "stress-type")?.parse::<StressType>()?,
                m1: *arg::<f64>(sub, "m1")?,
                m2: *arg::<f64>(sub, "m2")?,
                m_shear: *arg::<f64>(sub, "m-shear")?,
            };
            app_logic::run_endurance(&ranges, *arg::<f64>(sub, "detail-category")?, &params)
        }
        _ => Err(anyhow!("unknown command")),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    match dispatch(&matches) {
        Ok(output) => print!("{}", output),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }

    #[test]
    fn test_endurance_command() {
        let matches = cli()
            .try_get_matches_from(["fatigue-miner", "endurance", "--range", "100", "0", "--detail-category", "80", "--stress-type", "shear"])
            .unwrap();
        let out = dispatch(&matches).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.ends_with("0,inf\n"));
    }

    #[test]
    fn test_unsupported_stress_type() {
        let matches = cli()
            .try_get_matches_from(["fatigue-miner", "endurance", "--range", "100", "--detail-category", "80", "--stress-type", "bending"])
            .unwrap();
        let err = dispatch(&matches).unwrap_err();
        assert!(err.to_string().contains("unsupported stress type"));
    }
}
