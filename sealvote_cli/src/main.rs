use clap::{App, AppSettings, Arg, SubCommand};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use num_enum::TryFromPrimitive;
use std::convert::TryFrom;

mod args;
mod command_election;
mod command_events;
mod command_init;
mod command_post_transaction;
mod command_query;
mod command_rights;
mod command_time;
mod command_vote;
mod config;
mod error;
mod state;

pub use config::Config;
pub use error::CliError;

#[derive(TryFromPrimitive, PartialEq, Copy, Clone, Debug)]
#[repr(u8)]
enum Verbosity {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Verbosity {
    fn from_occurrences(quiet: bool, occurrences: u64) -> Self {
        if quiet {
            return Verbosity::Silent;
        }
        let level = (Verbosity::Warn as u64 + occurrences).min(Verbosity::Debug as u64);
        Verbosity::try_from(level as u8).unwrap_or(Verbosity::Debug)
    }

    fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Silent => LevelFilter::Off,
            Verbosity::Error => LevelFilter::Error,
            Verbosity::Warn => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
        }
    }
}

fn init_logging(verbosity: Verbosity) -> Result<(), CliError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})} {t} - {m}{n}")))
        .build();

    let config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(verbosity.level_filter()))
        .map_err(|e| CliError::Logging(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| CliError::Logging(e.to_string()))?;
    Ok(())
}

fn election_id_arg() -> Arg<'static, 'static> {
    Arg::with_name("ELECTION-ID")
        .index(1)
        .required(true)
        .help("Election id")
}

fn app() -> App<'static, 'static> {
    App::new("Sealvote CLI")
        .version("0.1.0")
        .about("Runs commit-reveal elections against a local sealvote ledger")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("state")
                .long("state")
                .takes_value(true)
                .help("Ledger snapshot file - can also be set with SEALVOTE_STATE"),
        )
        .arg(
            Arg::with_name("sender")
                .long("sender")
                .takes_value(true)
                .help("Sending account address - can also be set with SEALVOTE_SENDER"),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("Disables logging"),
        )
        .subcommand(
            SubCommand::with_name("init")
                .about("Create a new ledger snapshot")
                .arg(
                    Arg::with_name("admin")
                        .long("admin")
                        .takes_value(true)
                        .help("Account granted every role, defaults to the sender"),
                )
                .arg(
                    Arg::with_name("genesis")
                        .long("genesis")
                        .takes_value(true)
                        .conflicts_with("admin")
                        .help("Genesis config file in JSON format"),
                )
                .arg(
                    Arg::with_name("time")
                        .long("time")
                        .takes_value(true)
                        .help("Initial ledger time in unix seconds"),
                )
                .arg(
                    Arg::with_name("force")
                        .long("force")
                        .help("Replace an existing snapshot"),
                ),
        )
        .subcommand(
            SubCommand::with_name("election")
                .about("Create and inspect elections")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("create")
                        .about("Create an election (times accept +SECS relative to the ledger clock)")
                        .arg(Arg::with_name("NAME").index(1).required(true))
                        .arg(
                            Arg::with_name("start")
                                .long("start")
                                .takes_value(true)
                                .default_value("+0"),
                        )
                        .arg(
                            Arg::with_name("commit-deadline")
                                .long("commit-deadline")
                                .takes_value(true)
                                .required(true),
                        )
                        .arg(
                            Arg::with_name("reveal-deadline")
                                .long("reveal-deadline")
                                .takes_value(true)
                                .required(true),
                        )
                        .arg(
                            Arg::with_name("candidates")
                                .long("candidates")
                                .takes_value(true)
                                .multiple(true)
                                .use_delimiter(true)
                                .required(true)
                                .help("Comma separated candidate ids"),
                        )
                        .arg(
                            Arg::with_name("gated")
                                .long("gated")
                                .help("Only voting right holders may commit"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("show")
                        .about("Show an election with its phase and tallies")
                        .arg(election_id_arg()),
                ),
        )
        .subcommand(
            SubCommand::with_name("commitment")
                .about("Compute a vote commitment")
                .arg(Arg::with_name("CANDIDATE-ID").index(1).required(true))
                .arg(
                    Arg::with_name("salt")
                        .long("salt")
                        .takes_value(true)
                        .help("32 byte hex salt, random if omitted"),
                ),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Commit and reveal votes")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("commit")
                        .about("Commit a vote")
                        .arg(election_id_arg())
                        .arg(
                            Arg::with_name("commitment")
                                .long("commitment")
                                .takes_value(true)
                                .conflicts_with_all(&["candidate", "salt"]),
                        )
                        .arg(
                            Arg::with_name("candidate")
                                .long("candidate")
                                .takes_value(true)
                                .required_unless("commitment"),
                        )
                        .arg(Arg::with_name("salt").long("salt").takes_value(true)),
                )
                .subcommand(
                    SubCommand::with_name("reveal")
                        .about("Reveal a committed vote")
                        .arg(election_id_arg())
                        .arg(Arg::with_name("CANDIDATE-ID").index(2).required(true))
                        .arg(Arg::with_name("SALT").index(3).required(true)),
                ),
        )
        .subcommand(
            SubCommand::with_name("finalize")
                .about("Finalize an election after its reveal deadline")
                .arg(election_id_arg()),
        )
        .subcommand(
            SubCommand::with_name("rights")
                .about("Manage voting rights")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("grant")
                        .arg(election_id_arg())
                        .arg(
                            Arg::with_name("ACCOUNTS")
                                .index(2)
                                .multiple(true)
                                .required(true),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("revoke")
                        .arg(election_id_arg())
                        .arg(
                            Arg::with_name("ACCOUNTS")
                                .index(2)
                                .multiple(true)
                                .required(true),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("check")
                        .arg(election_id_arg())
                        .arg(Arg::with_name("ACCOUNT").index(2).required(true)),
                ),
        )
        .subcommand(
            SubCommand::with_name("role")
                .about("Manage roles (admin, election_authority, minter)")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("grant")
                        .arg(Arg::with_name("ROLE").index(1).required(true))
                        .arg(Arg::with_name("ACCOUNT").index(2).required(true)),
                )
                .subcommand(
                    SubCommand::with_name("revoke")
                        .arg(Arg::with_name("ROLE").index(1).required(true))
                        .arg(Arg::with_name("ACCOUNT").index(2).required(true)),
                ),
        )
        .subcommand(
            SubCommand::with_name("query")
                .about("Read election state")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(SubCommand::with_name("count"))
                .subcommand(SubCommand::with_name("times").arg(election_id_arg()))
                .subcommand(SubCommand::with_name("candidates").arg(election_id_arg()))
                .subcommand(SubCommand::with_name("results").arg(election_id_arg()))
                .subcommand(SubCommand::with_name("phase").arg(election_id_arg()))
                .subcommand(
                    SubCommand::with_name("tally")
                        .arg(election_id_arg())
                        .arg(Arg::with_name("CANDIDATE-ID").index(2).required(true)),
                )
                .subcommand(
                    SubCommand::with_name("commit")
                        .arg(election_id_arg())
                        .arg(Arg::with_name("VOTER").index(2).required(true)),
                )
                .subcommand(
                    SubCommand::with_name("revealed")
                        .arg(election_id_arg())
                        .arg(Arg::with_name("VOTER").index(2).required(true)),
                ),
        )
        .subcommand(
            SubCommand::with_name("time")
                .about("Show or move the ledger clock")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("advance")
                        .arg(Arg::with_name("SECS").index(1).required(true)),
                )
                .subcommand(
                    SubCommand::with_name("set")
                        .arg(Arg::with_name("TIMESTAMP").index(1).required(true)),
                )
                .subcommand(SubCommand::with_name("show")),
        )
        .subcommand(
            SubCommand::with_name("events")
                .about("Print the event log")
                .arg(Arg::with_name("since").long("since").takes_value(true))
                .arg(Arg::with_name("election").long("election").takes_value(true)),
        )
        .subcommand(
            SubCommand::with_name("audit")
                .about("Print the indexed audit trail")
                .arg(Arg::with_name("election").long("election").takes_value(true)),
        )
        .subcommand(
            SubCommand::with_name("post")
                .about("Post a transaction")
                .arg(
                    Arg::with_name("INPUT")
                        .index(1)
                        .required(true)
                        .help("Transaction file in JSON or CBOR format"),
                ),
        )
}

fn run(name: &str, matches: &clap::ArgMatches, config: &Config) -> Result<(), CliError> {
    match name {
        "init" => command_init::command_init(matches, config),
        "election" => command_election::command_election(matches, config),
        "commitment" => command_vote::command_commitment(matches),
        "vote" => command_vote::command_vote(matches, config),
        "finalize" => command_vote::command_finalize(matches, config),
        "rights" => command_rights::command_rights(matches, config),
        "role" => command_rights::command_role(matches, config),
        "query" => command_query::command_query(matches, config),
        "time" => command_time::command_time(matches, config),
        "events" => command_events::command_events(matches, config),
        "audit" => command_events::command_audit(matches, config),
        "post" => command_post_transaction::command_post_transaction(matches, config),
        _ => Err(CliError::MissingArgument("SUBCOMMAND")),
    }
}

fn main() {
    let matches = app().get_matches();

    let verbosity =
        Verbosity::from_occurrences(matches.is_present("quiet"), matches.occurrences_of("v"));
    if let Err(e) = init_logging(verbosity) {
        eprintln!("sealvote: {}", e);
    }

    let (name, sub_matches) = match matches.subcommand() {
        (name, Some(sub_matches)) => (name, sub_matches),
        _ => {
            eprintln!("sealvote: a subcommand is required");
            std::process::exit(1);
        }
    };

    let result = Config::from_env()
        .with_matches(&matches)
        .and_then(|config| run(name, sub_matches, &config));

    if let Err(e) = result {
        eprintln!("sealvote {}: {}", name, e);
        std::process::exit(1);
    }
}
