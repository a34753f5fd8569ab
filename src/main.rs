// vim: set ai et ts=4 sw=4 sts=4:
use std::fs;
use std::io::{self, Write};
use std::process;

use clap::{App, Arg, ArgMatches};
use log::LevelFilter;
use yaml_rust::{YamlEmitter, YamlLoader};

use nonogram_solver::puzzle::Puzzle;
use nonogram_solver::render;
use nonogram_solver::strategy::{SearchOptions, SolveEvent, SolveOutcome, Strategy};
use nonogram_solver::util::is_a_tty;

fn main() {
    let matches = App::new("nonogram-solver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Solves nonogram puzzles given as YAML hint files")
        .arg(Arg::with_name("input")
                 .help("puzzle file(s) to solve")
                 .required(true)
                 .multiple(true))
        .arg(Arg::with_name("no-guess")
                 .long("no-guess")
                 .help("Pure deduction only, no trial and error"))
        .arg(Arg::with_name("sequential")
                 .long("sequential")
                 .help("Try guess candidates in grid order instead of randomly"))
        .arg(Arg::with_name("max-depth")
                 .long("max-depth")
                 .takes_value(true)
                 .value_name("N")
                 .help("Maximum nesting of trial-and-error guesses"))
        .arg(Arg::with_name("yaml")
                 .long("yaml")
                 .help("Print the resulting grid as YAML instead of a board"))
        .arg(Arg::with_name("verbose")
                 .short("v")
                 .long("verbose")
                 .multiple(true)
                 .help("Increase log verbosity (-v, -vv, -vvv)"))
        .get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = setup_logger(level) {
        eprintln!("could not set up logging: {}", e);
        process::exit(2);
    }

    let options = match search_options(&matches) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    let mut all_solved = true;
    for input in matches.values_of("input").unwrap_or_default() {
        match run_file(input, options.clone(), matches.is_present("yaml")) {
            Ok(outcome) => all_solved &= outcome == SolveOutcome::Solved,
            Err(e)      => {
                eprintln!("{}: {}", input, e);
                all_solved = false;
            }
        }
    }
    if !all_solved {
        process::exit(1);
    }
}

fn setup_logger(level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .level(level)
        .chain(io::stderr())
        .apply()?;
    Ok(())
}

fn search_options(matches: &ArgMatches) -> Result<SearchOptions, String> {
    let mut options = SearchOptions::default();
    if matches.is_present("no-guess") {
        options.max_depth = 0;
    } else if let Some(depth) = matches.value_of("max-depth") {
        options.max_depth = depth.parse()
            .map_err(|_| format!("invalid --max-depth value '{}'", depth))?;
    }
    options.randomize = !matches.is_present("sequential");
    Ok(options)
}

fn run_file(input: &str, options: SearchOptions, as_yaml: bool)
    -> Result<SolveOutcome, Box<dyn std::error::Error>>
{
    eprintln!("Processing {}", input);
    let source = fs::read_to_string(input)?;
    let docs = YamlLoader::load_from_str(&source)?;
    let doc = docs.first().ok_or("empty puzzle file")?;
    let puzzle = Puzzle::from_yaml(doc)?;

    let interactive = is_a_tty(io::stderr());
    let mut strategy = Strategy::with_options(options);
    if interactive {
        // one dot per solver visit, like a progress bar
        strategy.set_observer(|event| {
            if let SolveEvent::LineVisited { .. } = event {
                eprint!(".");
                let _ = io::stderr().flush();
            }
        });
    }

    let outcome = strategy.solve(&puzzle);
    if interactive {
        eprintln!();
    }
    match outcome {
        SolveOutcome::Solved          => eprintln!("Puzzle solved!"),
        SolveOutcome::Contradiction   => eprintln!("Puzzle is unsolvable (contradictory hints)"),
        SolveOutcome::Unsolvable      => eprintln!("Puzzle is unsolvable"),
        SolveOutcome::Undetermined    => eprintln!("Could not solve puzzle"),
        SolveOutcome::BudgetExhausted => eprintln!("Could not solve puzzle within the search budget"),
    }

    if as_yaml {
        let mut text = String::new();
        YamlEmitter::new(&mut text).dump(&puzzle.to_yaml())?;
        println!("{}", text);
    } else {
        print!("{}", render::ascii(&puzzle, is_a_tty(io::stdout())));
    }
    Ok(outcome)
}
