//! VoltShare entry point: CLI wiring around the allocation engine.

use std::process;

use voltshare::billing::engine::{SystemStamper, calculate_bill_with};
use voltshare::billing::reading::Reading;
use voltshare::billing::statement::Statement;
use voltshare::billing::types::{AllocationInput, BillRecord};
use voltshare::cli::{self, CliOptions};
use voltshare::config::{BillingInput, RoomEntry};
use voltshare::io::export::{export_csv, statement_file_name};
use voltshare::logging;

/// Owner under which the CLI's bill is stored when serving the API.
#[cfg(feature = "api")]
const LOCAL_OWNER: &str = "local";

#[cfg(feature = "api")]
const DEFAULT_BIND: &str = "127.0.0.1:3000";

fn load_input(cli: &CliOptions) -> BillingInput {
    // --input takes priority; the parser guarantees one of the two is set
    let loaded = if let Some(ref path) = cli.input {
        BillingInput::from_toml_file(path)
    } else {
        BillingInput::from_preset(cli.preset.as_deref().unwrap_or("demo"))
    };
    let mut input = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(ref v) = cli.main_meter {
        input.bill.main_meter_kwh = Reading::from(v.as_str());
    }
    if let Some(ref v) = cli.rate {
        input.bill.rate_per_kwh = Reading::from(v.as_str());
    }
    if !cli.rooms.is_empty() {
        input.rooms = cli
            .rooms
            .iter()
            .map(|(name, kwh)| RoomEntry::new(name.clone(), kwh.as_str()))
            .collect();
    }
    if let Some(ref v) = cli.month {
        input.bill.month = v.clone();
    }
    if let Some(year) = cli.year {
        input.bill.year = year;
    }
    if let Some(ref v) = cli.property {
        input.bill.property_name = Some(v.clone());
    }
    input
}

fn log_malformed(input: &AllocationInput) {
    let malformed = input.malformed_readings();
    if !malformed.is_empty() {
        tracing::warn!(fields = ?malformed, "readings coerced to zero");
    }
}

fn log_outcome(record: &BillRecord) {
    tracing::info!(
        bill = %record.id,
        period = %record.period,
        rooms = record.rooms.len(),
        missing_kwh = record.missing_kwh,
        total = record.total_amount(),
        "bill calculated"
    );
    if record.submeter_excess() > 0.0 {
        tracing::warn!(
            excess_kwh = record.submeter_excess(),
            "submeters exceed the main meter; excess is not redistributed"
        );
    }
    if record.rooms.is_empty() && record.missing_kwh > 0.0 {
        tracing::warn!(
            missing_kwh = record.missing_kwh,
            "no rooms given; missing consumption is not attributed"
        );
    }
}

fn print_record(
    record: &BillRecord,
    #[cfg_attr(not(feature = "api"), allow(unused_variables))] cli: &CliOptions,
) {
    #[cfg(feature = "api")]
    if cli.json {
        match serde_json::to_string_pretty(record) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize bill: {e}");
                process::exit(1);
            }
        }
        return;
    }
    println!("{}", Statement(record));
}

fn main() {
    logging::init();

    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });

    let input = load_input(&cli);

    let errors = input.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let allocation_input = input.to_allocation_input();
    log_malformed(&allocation_input);
    let mut record = calculate_bill_with(&allocation_input, &SystemStamper);
    if let Some(ref name) = input.bill.property_name {
        record = record.with_property_name(name.clone());
    }
    log_outcome(&record);

    print_record(&record, &cli);

    if let Some(ref target) = cli.csv_out {
        let path = if target.is_dir() {
            target.join(statement_file_name(&record, "csv"))
        } else {
            target.clone()
        };
        if let Err(e) = export_csv(&record, &path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        tracing::info!(path = %path.display(), "statement exported");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        use voltshare::store::{BillStore, MemoryStore};

        let bind = cli.bind.as_deref().unwrap_or(DEFAULT_BIND);
        let addr: SocketAddr = bind.parse().unwrap_or_else(|e| {
            eprintln!("error: --bind value \"{bind}\" is not a socket address: {e}");
            process::exit(1);
        });

        let store = MemoryStore::new();
        if let Err(e) = store.save_bill(record, LOCAL_OWNER) {
            eprintln!("error: failed to store bill: {e}");
            process::exit(1);
        }
        let state = Arc::new(voltshare::api::AppState {
            store: Arc::new(store),
        });
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(voltshare::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
}
