#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use std::{
    error::Error,
    io::{self, Write},
    path::Path,
};

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use jpi_legacy::{fs::LocalFs, Workarounds, JENKINS_CORE_VERSION_ENV};

fn version_arg(name: &'static str, help: &'static str) -> Arg<'static, 'static> {
    Arg::with_name(name).value_name("VERSION").help(help).required(true)
}

fn app() -> App<'static, 'static> {
    App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .setting(AppSettings::SubcommandRequired)
        .subcommand(
            SubCommand::with_name("older-than")
                .about("check whether a version is strictly older than a bound")
                .arg(version_arg("subject", "version to check"))
                .arg(version_arg("upper", "exclusive upper bound")),
        )
        .subcommand(
            SubCommand::with_name("between")
                .about("check whether a version lies in [lower, upper)")
                .arg(version_arg("subject", "version to check"))
                .arg(version_arg("lower", "inclusive lower bound"))
                .arg(version_arg("upper", "exclusive upper bound")),
        )
        .subcommand(
            SubCommand::with_name("before")
                .about("apply JENKINS-26331 workarounds before a build task")
                .arg(
                    Arg::with_name("task")
                        .value_name("TASK")
                        .help("task about to run, e.g. test or clean")
                        .required(true),
                )
                .arg(
                    Arg::with_name("jenkins-version")
                        .long("jenkins-version")
                        .value_name("VERSION")
                        .help("Jenkins core version the plugin builds against")
                        .env(JENKINS_CORE_VERSION_ENV)
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("project-dir")
                        .long("project-dir")
                        .value_name("DIR")
                        .help("plugin project directory")
                        .default_value(".")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("dry-run")
                        .long("dry-run")
                        .help("print matching actions without performing them"),
                ),
        )
        .subcommand(SubCommand::with_name("list").about("list built-in workarounds"))
}

fn before<W: Write>(matches: &ArgMatches, out: &mut W) -> Result<(), Box<dyn Error>> {
    // These cannot panic because of CLAP required flags and defaults.
    let task = matches.value_of("task").unwrap();
    let version = matches.value_of("jenkins-version").unwrap();
    let project_dir = Path::new(matches.value_of("project-dir").unwrap());

    let workarounds = Workarounds::jenkins_26331();
    debug!("running workarounds before {} in {}", task, project_dir.display());

    if matches.is_present("dry-run") {
        for workaround in workarounds.plan(task, version)? {
            writeln!(out, "would {}", workaround.action)?;
        }
    } else {
        for applied in workarounds.before_task(task, version, project_dir, &LocalFs)? {
            writeln!(out, "{}", applied)?;
        }
    }

    Ok(())
}

fn run<W: Write>(matches: &ArgMatches, out: &mut W) -> Result<(), Box<dyn Error>> {
    match matches.subcommand() {
        ("older-than", Some(matches)) => {
            let subject = matches.value_of("subject").unwrap();
            let upper = matches.value_of("upper").unwrap();
            writeln!(out, "{}", jpi_legacy::is_older_than(subject, upper)?)?;
        }
        ("between", Some(matches)) => {
            let subject = matches.value_of("subject").unwrap();
            let lower = matches.value_of("lower").unwrap();
            let upper = matches.value_of("upper").unwrap();
            writeln!(out, "{}", jpi_legacy::is_between(subject, lower, upper)?)?;
        }
        ("before", Some(matches)) => before(matches, out)?,
        ("list", ..) => {
            for workaround in Workarounds::jenkins_26331().entries() {
                writeln!(out, "{}", workaround)?;
            }
        }
        (..) => unreachable!(),
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let matches = app().get_matches();
    let stdout = io::stdout();
    run(&matches, &mut stdout.lock())
}
