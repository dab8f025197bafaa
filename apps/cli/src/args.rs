use std::env;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub dialect: Option<String>,
    pub site: Option<i64>,
    pub workers: Option<usize>,
    pub interval_secs: Option<u64>,
    pub json: bool,
}

pub fn parse_args() -> Result<CliArgs, String> {
    parse_from(env::args().skip(1))
}

fn parse_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        let mut value_for = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value_for("--config")?)),
            "--db" => parsed.db = Some(PathBuf::from(value_for("--db")?)),
            "--dialect" => parsed.dialect = Some(value_for("--dialect")?),
            "--site" => {
                let value = value_for("--site")?;
                let site = value
                    .parse::<i64>()
                    .map_err(|_| format!("invalid site id: {value}"))?;
                parsed.site = Some(site);
            }
            "--workers" => {
                let value = value_for("--workers")?;
                let workers = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid worker count: {value}"))?;
                parsed.workers = Some(workers);
            }
            "--interval" => {
                let value = value_for("--interval")?;
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| format!("invalid interval: {value}"))?;
                parsed.interval_secs = Some(secs);
            }
            "--json" => {
                parsed.json = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

pub fn print_help() {
    println!(
        "Browser stats rollup\n\n\
Usage:\n  browser-stats [--config <path>] [--db <path>] [--dialect sqlite|postgres]\n                [--site <id>] [--workers <n>] [--interval <secs>] [--json]\n\n\
Options:\n  --config <path>    Config file (created with defaults if missing)\n  --db <path>        Override the database path\n  --dialect <name>   Hour bucketing dialect: sqlite or postgres\n  --site <id>        Roll up a single site instead of all sites\n  --workers <n>      Sites rolled up in parallel (0 = one per core)\n  --interval <secs>  Keep running, one pass every <secs> seconds\n  --json             Print pass summaries as JSON\n  -h, --help         Show this help message\n"
    );
}
