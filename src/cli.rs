use std::path::PathBuf;

use crate::battle::diagnostics::Diagnostics;
use crate::battle::dmglog::Attribution;
use crate::config::{Config, Locale, OutputFormat};
use crate::report::{BrowseKind, ReportError, Table};
use crate::session::{Session, SessionError};

const USAGE: &str = "usage: bgrview <dmglog|browse|validate>";
const DMGLOG_USAGE: &str = "usage: bgrview dmglog <log-file> [--master <xml|json>] [--format table|csv|json|html] [--locale en|ja] [--attribution source|by_role] [--filter <text>] [--sort <column>[:desc]]";
const BROWSE_USAGE: &str = "usage: bgrview browse <units|equips|skills|buffs|items|quests|stages> [--master <xml|json>] [--format table|csv|json|html] [--filter <text>] [--sort <column>[:desc]]";
const VALIDATE_USAGE: &str = "usage: bgrview validate [--master <xml|json>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    DamageLog,
    Browse,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("dmglog") => Some(Command::DamageLog),
        Some("browse") => Some(Command::Browse),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let (usage, max_positionals) = match command {
        Command::DamageLog => (DMGLOG_USAGE, 1),
        Command::Browse => (BROWSE_USAGE, 1),
        Command::Validate => (VALIDATE_USAGE, 0),
    };
    let options = match Options::parse(&args[2..]) {
        Ok(options) if options.positionals.len() <= max_positionals => options,
        Ok(_) => {
            eprintln!("{usage}");
            return 2;
        }
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{usage}");
            return 2;
        }
    };
    let config = match Config::load() {
        Ok(config) => options.apply(config),
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };

    match command {
        Command::DamageLog => handle_dmglog(&options, config),
        Command::Browse => handle_browse(&options, config),
        Command::Validate => handle_validate(config),
    }
}

/// Flags shared by all subcommands, plus positional arguments in order.
#[derive(Debug, Default)]
struct Options {
    positionals: Vec<String>,
    master: Option<PathBuf>,
    format: Option<OutputFormat>,
    locale: Option<Locale>,
    attribution: Option<Attribution>,
    filter: Option<String>,
    sort: Option<(String, bool)>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = Options::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let flag = arg.as_str();
            if !flag.starts_with("--") {
                options.positionals.push(arg.clone());
                continue;
            }
            let value = iter
                .next()
                .ok_or_else(|| format!("missing value for {flag}"))?;
            match flag {
                "--master" => options.master = Some(PathBuf::from(value)),
                "--format" => options.format = Some(value.parse().map_err(|e| format!("{e}"))?),
                "--locale" => options.locale = Some(value.parse().map_err(|e| format!("{e}"))?),
                "--attribution" => {
                    options.attribution = Some(value.parse().map_err(|e| format!("{e}"))?)
                }
                "--filter" => options.filter = Some(value.clone()),
                "--sort" => options.sort = Some(parse_sort(value)),
                _ => return Err(format!("unknown option {flag}")),
            }
        }
        Ok(options)
    }

    fn apply(&self, mut config: Config) -> Config {
        if let Some(master) = &self.master {
            config.master_data = master.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(locale) = self.locale {
            config.locale = locale;
        }
        if let Some(attribution) = self.attribution {
            config.attribution = attribution;
        }
        config
    }

    /// Apply `--filter` and `--sort` to every table; a sort column must exist
    /// in at least one of them.
    fn shape(&self, tables: &mut [&mut Table]) -> Result<(), ReportError> {
        if let Some(query) = &self.filter {
            for table in tables.iter_mut() {
                table.filter(query);
            }
        }
        if let Some((column, descending)) = &self.sort {
            let mut sorted = false;
            for table in tables.iter_mut() {
                if table.column_index(column).is_some() {
                    table.sort_by(column, *descending)?;
                    sorted = true;
                }
            }
            if !sorted {
                return Err(ReportError::UnknownColumn(column.clone()));
            }
        }
        Ok(())
    }
}

fn parse_sort(raw: &str) -> (String, bool) {
    match raw.rsplit_once(':') {
        Some((column, "desc")) => (column.to_string(), true),
        Some((column, "asc")) => (column.to_string(), false),
        _ => (raw.to_string(), false),
    }
}

fn load_session(config: Config) -> Result<Session, i32> {
    let mut session = Session::new(config);
    match session.load_configured_master_data() {
        Ok(_) => Ok(session),
        Err(err) => {
            eprintln!("master data unavailable: {err}");
            eprintln!("{}", SessionError::NoMasterData);
            Err(2)
        }
    }
}

fn handle_dmglog(options: &Options, config: Config) -> i32 {
    let Some(log_path) = options.positionals.first() else {
        eprintln!("{DMGLOG_USAGE}");
        return 2;
    };
    let session = match load_session(config) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let mut diagnostics = Diagnostics::new();
    let report = match session.read_damage_log(log_path, &mut diagnostics) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("battle log failed: {err}");
            return 1;
        }
    };
    for (kind, count) in diagnostics.summary() {
        tracing::warn!(kind = %kind, count, "battle log lines or actions skipped");
    }

    let (mut actions, mut units) = match session.damage_tables(&report) {
        Ok(tables) => tables,
        Err(err) => {
            eprintln!("report failed: {err}");
            return 1;
        }
    };
    if let Err(err) = options.shape(&mut [&mut actions, &mut units]) {
        eprintln!("{err}");
        return 2;
    }

    let format = session.config.format;
    let rendered = if format == OutputFormat::Json {
        let payload = serde_json::json!({
            "action_log": actions.to_json_value(),
            "units": units.to_json_value(),
        });
        serde_json::to_string_pretty(&payload).map_err(ReportError::from)
    } else {
        actions
            .render(format)
            .and_then(|a| units.render(format).map(|u| format!("{a}\n{u}")))
    };
    emit(rendered)
}

fn handle_browse(options: &Options, config: Config) -> i32 {
    let Some(raw_kind) = options.positionals.first() else {
        eprintln!("{BROWSE_USAGE}");
        return 2;
    };
    let kind = match raw_kind.parse::<BrowseKind>() {
        Ok(kind) => kind,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{BROWSE_USAGE}");
            return 2;
        }
    };
    let session = match load_session(config) {
        Ok(session) => session,
        Err(code) => return code,
    };
    let mut table = match session.browse(kind) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("browse failed: {err}");
            return 1;
        }
    };
    if let Err(err) = options.shape(&mut [&mut table]) {
        eprintln!("{err}");
        return 2;
    }
    emit(table.render(session.config.format))
}

fn handle_validate(config: Config) -> i32 {
    let session = match load_session(config) {
        Ok(session) => session,
        Err(code) => return code,
    };
    let Some(master) = session.master() else {
        eprintln!("{}", SessionError::NoMasterData);
        return 2;
    };
    println!("master data: {}", session.config.master_data.display());
    for (tag, count) in master.summary() {
        println!("{tag}\t{count}");
    }
    println!("skipped_without_id\t{}", master.skipped_without_id);
    0
}

fn emit(rendered: Result<String, ReportError>) -> i32 {
    match rendered {
        Ok(output) => {
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
            0
        }
        Err(err) => {
            eprintln!("failed to render output: {err}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unknown_command_is_usage_error() {
        assert_eq!(parse_command(&args(&["bgrview", "serve"])), None);
        assert_eq!(run_with_args(&args(&["bgrview"])), 2);
    }

    #[test]
    fn options_collect_flags_and_positionals() {
        let options = Options::parse(&args(&[
            "log.ndjson",
            "--format",
            "csv",
            "--sort",
            "damage given:desc",
            "--attribution",
            "by_role",
        ]))
        .expect("options");
        assert_eq!(options.positionals, vec!["log.ndjson"]);
        assert_eq!(options.format, Some(OutputFormat::Csv));
        assert_eq!(options.sort, Some(("damage given".to_string(), true)));
        assert_eq!(options.attribution, Some(Attribution::ByRole));
    }

    #[test]
    fn options_reject_unknown_flags_and_missing_values() {
        assert!(Options::parse(&args(&["--bogus", "1"])).is_err());
        assert!(Options::parse(&args(&["--format"])).is_err());
        assert!(Options::parse(&args(&["--locale", "fr"])).is_err());
    }

    #[test]
    fn flags_override_config() {
        let options = Options::parse(&args(&["--locale", "ja", "--master", "m.json"])).expect("options");
        let config = options.apply(Config::default());
        assert_eq!(config.locale, Locale::Ja);
        assert_eq!(config.master_data, PathBuf::from("m.json"));
    }
}
