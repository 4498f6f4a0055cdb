// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    clap::{Arg, ArgMatches, Command},
    dpkg_status::{
        error::DpkgStatusError,
        package::PackageRecord,
        status::{
            get_all_packages, get_package, get_package_and_reverse_dependencies,
            DEFAULT_STATUS_PATH,
        },
    },
    log::{debug, LevelFilter},
    std::{collections::BTreeSet, ffi::OsStr, path::Path},
    thiserror::Error,
};

const SHOW_ABOUT: &str = "\
Show details of an installed package.

Prints the fields recorded for the package in the dpkg status database, its
dependencies and its reverse dependencies.

Dependencies are printed one per line. A line listing several packages
separated by `|` is satisfied by any one of them. Version constraints are not
retained.

Reverse dependencies are packages whose `Depends` field names the package in
any alternative. They are only computed if the package itself is present in
the database.
";

#[derive(Debug, Error)]
pub enum DstError {
    #[error("argument parsing error: {0:?}")]
    Clap(#[from] clap::Error),

    #[error("{0}")]
    DpkgStatus(#[from] DpkgStatusError),

    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0:?}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("package not found: {0}")]
    PackageNotFound(String),

    #[error("invalid sub-command: {0}")]
    InvalidSubCommand(String),
}

pub type Result<T> = std::result::Result<T, DstError>;

pub fn run_cli() -> Result<()> {
    let app = Command::new("dpkg Status Tool")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gregory Szorc <gregory.szorc@gmail.com>")
        .about("Inspect the dpkg status database")
        .arg_required_else_help(true);

    let app = app
        .arg(
            Arg::new("status-file")
                .long("status-file")
                .takes_value(true)
                .default_value(DEFAULT_STATUS_PATH)
                .allow_invalid_utf8(true)
                .global(true)
                .help("Path to the dpkg status database to read"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .multiple_occurrences(true)
                .help("Increase logging verbosity. Can be specified multiple times."),
        );

    let json_arg = Arg::new("json")
        .long("json")
        .help("Print records as JSON");

    let package_arg = Arg::new("package")
        .required(true)
        .takes_value(true)
        .help("Name of the package");

    let app = app.subcommand(
        Command::new("list")
            .about("List all packages sorted by name")
            .arg(json_arg.clone()),
    );

    let app = app.subcommand(
        Command::new("show")
            .about("Show a package and its reverse dependencies")
            .long_about(SHOW_ABOUT)
            .arg(json_arg)
            .arg(package_arg.clone()),
    );

    let app = app.subcommand(
        Command::new("rdepends")
            .about("Print names of packages depending on a package")
            .arg(package_arg.clone()),
    );

    let mut app = app.subcommand(
        Command::new("raw")
            .about("Print the status database paragraph of a package")
            .arg(package_arg),
    );

    let matches = app.clone().get_matches();

    let log_level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    builder.init();

    match matches.subcommand() {
        Some(("list", args)) => command_list(args),
        Some(("show", args)) => command_show(args),
        Some(("rdepends", args)) => command_rdepends(args),
        Some(("raw", args)) => command_raw(args),
        Some((command, _)) => Err(DstError::InvalidSubCommand(command.to_string())),
        None => {
            app.print_help()?;
            Ok(())
        }
    }
}

fn status_path(args: &ArgMatches) -> &Path {
    Path::new(
        args.value_of_os("status-file")
            .unwrap_or_else(|| OsStr::new(DEFAULT_STATUS_PATH)),
    )
}

fn package_name(args: &ArgMatches) -> &str {
    args.value_of("package")
        .expect("package argument is required")
}

fn command_list(args: &ArgMatches) -> Result<()> {
    let path = status_path(args);
    debug!("reading packages from {}", path.display());

    let mut packages = get_all_packages(path)?;
    packages.sort_by(|a, b| a.name().cmp(b.name()));

    if args.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&packages)?);
    } else {
        print!("{}", format_package_table(&packages));
    }

    Ok(())
}

fn command_show(args: &ArgMatches) -> Result<()> {
    let name = package_name(args);

    let (package, reverse) = get_package_and_reverse_dependencies(status_path(args), name)?;
    let package = package.ok_or_else(|| DstError::PackageNotFound(name.to_string()))?;

    if args.is_present("json") {
        let value = serde_json::json!({
            "package": package,
            "reverse_dependencies": reverse,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", format_package_details(&package, &reverse));
    }

    Ok(())
}

fn command_rdepends(args: &ArgMatches) -> Result<()> {
    let name = package_name(args);

    let (package, reverse) = get_package_and_reverse_dependencies(status_path(args), name)?;
    if package.is_none() {
        return Err(DstError::PackageNotFound(name.to_string()));
    }

    for dependent in reverse {
        println!("{}", dependent);
    }

    Ok(())
}

fn command_raw(args: &ArgMatches) -> Result<()> {
    let name = package_name(args);

    let package = get_package(status_path(args), name)?
        .ok_or_else(|| DstError::PackageNotFound(name.to_string()))?;
    println!("{}", package.raw_paragraph().trim_end());

    Ok(())
}

/// Render packages as aligned `name version architecture` rows plus a count line.
fn format_package_table(packages: &[PackageRecord]) -> String {
    let name_width = packages.iter().map(|p| p.name().len()).max().unwrap_or(0);
    let version_width = packages
        .iter()
        .map(|p| p.version().len())
        .max()
        .unwrap_or(0);

    let mut res = packages
        .iter()
        .map(|p| {
            format!(
                "{:name_width$}  {:version_width$}  {}",
                p.name(),
                p.version(),
                p.architecture(),
                name_width = name_width,
                version_width = version_width,
            )
            .trim_end()
            .to_string()
                + "\n"
        })
        .collect::<String>();

    res.push_str(&format!("{} packages\n", packages.len()));

    res
}

fn format_package_details(package: &PackageRecord, reverse: &BTreeSet<String>) -> String {
    let mut lines = vec![
        format!("Package: {}", package.name()),
        format!("Status: {}", package.status()),
        format!("Priority: {}", package.priority()),
        format!("Section: {}", package.section()),
        format!("Installed-Size: {}", package.installed_size()),
        format!("Maintainer: {}", package.maintainer()),
        format!("Architecture: {}", package.architecture()),
        format!("Version: {}", package.version()),
        format!("Description: {}", package.description()),
        String::new(),
        "Dependencies:".to_string(),
    ];

    if package.dependencies().is_empty() {
        lines.push("  (none)".to_string());
    } else {
        lines.extend(
            package
                .dependencies()
                .iter_groups()
                .map(|group| format!("  {}", group)),
        );
    }

    lines.push(String::new());
    lines.push("Reverse Dependencies:".to_string());

    if reverse.is_empty() {
        lines.push("  (none)".to_string());
    } else {
        lines.extend(reverse.iter().map(|name| format!("  {}", name)));
    }

    lines.join("\n") + "\n"
}
