use automata_forge::automaton::Automaton;
use automata_forge::config::ForgeConfig;
use automata_forge::error_handling::Result;
use automata_forge::io::AutomatonFile;
use automata_forge::language::LanguageScript;

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = match matches.subcommand() {
        Some(("compile", sub)) => match sub.get_one::<String>("config") {
            Some(path) => ForgeConfig::parse_from_file(path.as_str())?,
            None => ForgeConfig::default(),
        },
        _ => ForgeConfig::default(),
    };
    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        config.log_level()
    };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    match matches.subcommand() {
        Some(("compile", sub)) => compile(sub, &config),
        Some(("run", sub)) => run(sub),
        Some(("table", sub)) => table(sub),
        Some((name, sub)) => transform(name, sub),
        None => Ok(()),
    }
}

fn cli() -> Command {
    let automaton_arg = Arg::new("automaton")
        .help("Path to the .automaton file")
        .required(true)
        .value_name("AUTOMATON_FILE");
    let output_arg = Arg::new("output")
        .short('o')
        .long("output")
        .help("Where to write the resulting .automaton file (stdout if absent)")
        .value_name("OUTPUT_FILE");

    Command::new("forge")
        .version(automata_forge::version())
        .about("Compile, transform and run finite automata")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log algorithm progress")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("compile")
                .about("Compile a language script into an automaton")
                .arg(
                    Arg::new("script")
                        .help("Path to the .lsf language script")
                        .required(true)
                        .value_name("SCRIPT_FILE"),
                )
                .arg(output_arg.clone())
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to the YAML pipeline config")
                        .value_name("CONFIG_FILE"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Report whether each input is accepted")
                .arg(automaton_arg.clone())
                .arg(
                    Arg::new("input")
                        .help("Words to run")
                        .num_args(1..)
                        .required(true)
                        .value_name("INPUT"),
                ),
        )
        .subcommand(
            Command::new("determinize")
                .about("Subset construction")
                .arg(automaton_arg.clone())
                .arg(output_arg.clone()),
        )
        .subcommand(
            Command::new("minimize")
                .about("Determinize if needed, then merge equivalent states")
                .arg(automaton_arg.clone())
                .arg(output_arg.clone()),
        )
        .subcommand(
            Command::new("negate")
                .about("Complement the accepted language")
                .arg(automaton_arg.clone())
                .arg(output_arg),
        )
        .subcommand(
            Command::new("table")
                .about("Print the transition table")
                .arg(automaton_arg),
        )
}

fn load(matches: &ArgMatches) -> Result<Automaton> {
    let path: &String = matches.get_one("automaton").expect("required by clap");
    AutomatonFile::load(path.as_str())?.to_automaton()
}

fn emit(automaton: &Automaton, matches: &ArgMatches) -> Result<()> {
    let file = AutomatonFile::from_automaton(automaton);
    match matches.get_one::<String>("output") {
        Some(path) => file.save(path.as_str()),
        None => {
            println!("{}", file.to_json_string()?);
            Ok(())
        }
    }
}

fn compile(matches: &ArgMatches, config: &ForgeConfig) -> Result<()> {
    let path: &String = matches.get_one("script").expect("required by clap");
    let nfa = LanguageScript::parse_from_file(path.as_str())?.compile()?;
    info!("Compiled {} into {} states", path, nfa.core().states().len());

    let automaton = if config.minimize() {
        Automaton::from(nfa.to_deterministic().minimize())
    } else if config.determinize() {
        Automaton::from(nfa.to_deterministic())
    } else {
        Automaton::from(nfa)
    };
    emit(&automaton, matches)
}

fn run(matches: &ArgMatches) -> Result<()> {
    let automaton = load(matches)?;
    for input in matches.get_many::<String>("input").into_iter().flatten() {
        let verdict = if automaton.run(input) { "accept" } else { "reject" };
        println!("{}\t{}", verdict, input);
    }
    Ok(())
}

fn transform(command: &str, matches: &ArgMatches) -> Result<()> {
    let automaton = load(matches)?;
    let transformed = match command {
        "minimize" => automaton.into_deterministic().minimize(),
        "negate" => automaton.complement(),
        _ => automaton.into_deterministic(),
    };
    emit(&Automaton::from(transformed), matches)
}

fn table(matches: &ArgMatches) -> Result<()> {
    let automaton = load(matches)?;
    let table = match &automaton {
        Automaton::Deterministic(dfa) => dfa.core().transition_table(),
        Automaton::Nondeterministic(nfa) => nfa.effective_transition_table(),
    };
    let core = automaton.core();
    for (state, row) in &table {
        let mut marker = String::new();
        if *state == core.start() {
            marker.push('>');
        }
        if core.is_final(*state) {
            marker.push('*');
        }
        let cells: Vec<String> = row
            .iter()
            .map(|(symbol, targets)| format!("{}: {:?}", symbol, targets))
            .collect();
        println!("{:>2}{}\t{}", marker, state, cells.join("\t"));
    }
    Ok(())
}
