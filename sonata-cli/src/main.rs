use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::Error;
use clap::{App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use sonata::config::SolverConfig;
use sonata::solver::{SolveResult, Solver};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    // All log output goes to stdout as DIMACS comment lines
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("SONATA_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is sonata {}", env!("CARGO_PKG_VERSION"));
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("sonata")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg(Arg::from_usage(
            "[INPUT] 'The input file to use (stdin if omitted)'",
        ))
        .arg(Arg::from_usage(
            "[config-file] --config=[FILE] 'Read solver parameters from a TOML configuration file'",
        ))
        .get_matches();

    init_logging();
    banner();

    let mut solver = Solver::new();

    if let Some(config_path) = matches.value_of("config-file") {
        let mut config_contents = String::new();
        fs::File::open(config_path)?.read_to_string(&mut config_contents)?;

        let config: SolverConfig = toml::from_str(&config_contents)?;
        solver.set_config(config)?;
    }

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    solver.add_dimacs_cnf(file)?;

    // SAT competition conventions: exit code 10 for SAT, 20 for UNSAT, 0 otherwise
    match solver.solve() {
        SolveResult::Sat => {
            println!("s SATISFIABLE");
            print!("v");
            for lit in solver.model().unwrap() {
                print!(" {}", lit);
            }
            println!(" 0");
            Ok(10)
        }
        SolveResult::Unsat => {
            println!("s UNSATISFIABLE");
            Ok(20)
        }
        SolveResult::Interrupted => {
            println!("s UNKNOWN");
            Ok(0)
        }
    }
}
