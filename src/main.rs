use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use zoneshift::adapter::OsTimezoneAdapter;
use zoneshift::apply::TimezoneApplier;
use zoneshift::config::Settings;
use zoneshift::logger::EventLog;
use zoneshift::notify::StderrNotifier;
use zoneshift::poller::{CycleOutcome, ZonePoller};
use zoneshift::position::{FixedPosition, GeoPosition, IpPositionSource, PositionSource};
use zoneshift::resolver::{HttpZoneLookup, Resolution, ZoneResolver};
use zoneshift::translate;

/// Zoneshift — keeps the OS timezone in sync with the current GPS position.
///
/// Samples a position on a fixed interval, resolves it to an IANA zone,
/// translates that to the OS's native zone key, and applies the change only
/// when the active zone actually differs.
///
/// Examples:
///   zoneshift
///   zoneshift --interval 60
///   zoneshift --lat 48.8566 --lon 2.3522 --once
///   zoneshift --lat 51.5074 --lon -0.1278 --dry-run
#[derive(Parser)]
#[command(name = "zoneshift", version, about, long_about = None)]
struct Cli {
    /// Latitude (-90 to 90). Pins the position instead of IP geolocation.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Poll interval in seconds (overrides the config file).
    #[arg(long)]
    interval: Option<u64>,

    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,

    /// Resolve and translate only; never touch the OS timezone.
    #[arg(long)]
    dry_run: bool,

    /// Config file path (default ~/.zoneshift/config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file path. Without it, log lines go to stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load_from(&config_path);

    let log = match &cli.log_file {
        Some(path) => EventLog::to_file(path.clone(), settings.log_events),
        None => EventLog::to_stderr(settings.log_events),
    };

    let source = position_source(&cli);
    let resolver = ZoneResolver::new(Box::new(HttpZoneLookup::new()));

    if cli.dry_run {
        run_dry(source, resolver);
        return;
    }

    let adapter = platform_adapter().unwrap_or_else(|| {
        eprintln!("Error: no timezone adapter for this platform. Use --dry-run.");
        std::process::exit(1);
    });
    let applier = TimezoneApplier::new(adapter, Box::new(StderrNotifier), log.clone());

    let interval = Duration::from_secs(cli.interval.unwrap_or(settings.refresh_secs));
    log.write(&format!(
        "starting (interval {}s, translation table {} zones)",
        interval.as_secs(),
        translate::table_len()
    ));

    let poller = ZonePoller::new(source, resolver, applier, log, interval);

    if cli.once {
        match poller.run_cycle() {
            CycleOutcome::NoFix => println!("no GPS fix"),
            CycleOutcome::Unchanged => println!("timezone already correct"),
            CycleOutcome::Applied { previous, current } => {
                println!("timezone changed: '{}' -> '{}'", previous, current)
            }
            CycleOutcome::Failed(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let handle = poller.spawn().unwrap_or_else(|e| {
        eprintln!("Error: cannot start poll worker: {}", e);
        std::process::exit(1);
    });
    handle.wait();
}

fn position_source(cli: &Cli) -> Box<dyn PositionSource> {
    match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => {
            let pos = GeoPosition::new(lat, lon);
            if !pos.in_range() {
                eprintln!("Error: Invalid coordinates. Lat: -90..90, Lon: -180..180");
                std::process::exit(1);
            }
            Box::new(FixedPosition(pos))
        }
        (None, None) => Box::new(IpPositionSource),
        _ => {
            eprintln!("Error: --lat and --lon must be given together.");
            std::process::exit(1);
        }
    }
}

fn run_dry(source: Box<dyn PositionSource>, resolver: ZoneResolver) {
    let position = source.current_position();
    println!("position: {}", position);

    let tz = match resolver.resolve(&position) {
        Ok(Resolution::NoFix) => {
            println!("no GPS fix; nothing to resolve");
            return;
        }
        Ok(Resolution::Zone(tz)) => tz,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    println!("IANA zone: {}", tz.name());

    match translate::translate(tz.name()) {
        Ok(key) => println!("native zone key: {}", key),
        Err(e) => println!("unmapped: {}", e),
    }
}

#[cfg(windows)]
fn platform_adapter() -> Option<Arc<dyn OsTimezoneAdapter + Sync>> {
    Some(Arc::new(zoneshift::adapter::windows::WindowsAdapter::new()))
}

#[cfg(not(windows))]
fn platform_adapter() -> Option<Arc<dyn OsTimezoneAdapter + Sync>> {
    None
}
