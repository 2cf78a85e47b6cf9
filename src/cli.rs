use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    pub input: Option<PathBuf>,
    pub preset: Option<String>,
    pub main_meter: Option<String>,
    pub rate: Option<String>,
    /// `(name, kwh)` pairs from repeated `--room`; replaces configured rooms.
    pub rooms: Vec<(String, String)>,
    pub month: Option<String>,
    pub year: Option<i32>,
    pub property: Option<String>,
    pub csv_out: Option<PathBuf>,
    #[cfg(feature = "api")]
    pub json: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub bind: Option<String>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --input (expected a TOML file path)")?;
                if opts.input.replace(PathBuf::from(path)).is_some() {
                    return Err("--input provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--main-meter" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --main-meter (expected kWh)")?;
                opts.main_meter = Some(value.to_string());
            }
            "--rate" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --rate (expected price per kWh)")?;
                opts.rate = Some(value.to_string());
            }
            "--room" => {
                i += 1;
                let pair = args.next_or_err(i, "missing value for --room (expected NAME=KWH)")?;
                let (name, kwh) = pair
                    .rsplit_once('=')
                    .ok_or_else(|| format!("invalid --room \"{pair}\" (expected NAME=KWH)"))?;
                if name.trim().is_empty() {
                    return Err(format!("invalid --room \"{pair}\" (room name is empty)"));
                }
                opts.rooms.push((name.trim().to_string(), kwh.to_string()));
            }
            "--month" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --month (expected a period label)")?;
                opts.month = Some(value.to_string());
            }
            "--year" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --year (expected an integer)")?;
                let year = value
                    .parse::<i32>()
                    .map_err(|_| format!("--year value \"{value}\" is not a valid year"))?;
                opts.year = Some(year);
            }
            "--property" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --property (expected a name)")?;
                opts.property = Some(value.to_string());
            }
            "--csv-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --csv-out (expected a file path)")?;
                if opts.csv_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--csv-out provided more than once".to_string());
                }
            }
            #[cfg(feature = "api")]
            "--json" => {
                opts.json = true;
            }
            #[cfg(feature = "api")]
            "--serve" => {
                opts.serve = true;
            }
            #[cfg(feature = "api")]
            "--bind" => {
                i += 1;
                let addr = args.next_or_err(i, "missing value for --bind (expected HOST:PORT)")?;
                opts.bind = Some(addr.to_string());
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.input.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--input` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if opts.input.is_none() && opts.preset.is_none() {
        opts.preset = Some("demo".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("voltshare: split unmetered energy across rooms and bill it");
    eprintln!();
    eprintln!("Usage: voltshare [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --input <path>        Load billing input from a TOML file");
    eprintln!("  --preset <name>       Use a built-in input (demo, dormitory, over_reported)");
    eprintln!("  --main-meter <kwh>    Override the main meter reading");
    eprintln!("  --rate <price>        Override the price per kWh");
    eprintln!("  --room <name=kwh>     Room reading (repeatable, replaces configured rooms)");
    eprintln!("  --month <label>       Override the billing period label");
    eprintln!("  --year <year>         Override the billing year");
    eprintln!("  --property <name>     Property name printed on the statement");
    eprintln!("  --csv-out <path>      Export the bill as CSV (a directory gets the default name)");
    #[cfg(feature = "api")]
    {
        eprintln!("  --json                Print the bill record as JSON instead of a statement");
        eprintln!("  --serve               Start the REST API after printing the bill");
        eprintln!("  --bind <host:port>    API bind address (default: 127.0.0.1:3000)");
    }
    eprintln!("  --help                Show this help message");
    eprintln!();
    eprintln!("If neither --input nor --preset is given, the demo preset is used.");
}
