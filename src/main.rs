use clap::Parser;
use log::{error, info, warn};
use sensor_monitor::clock::SystemClock;
use sensor_monitor::config::{self, Config, parse_sample_rate};
use sensor_monitor::error::Result;
use sensor_monitor::input::SimulatedPlatform;
use sensor_monitor::input::simulation::run_sensor_simulation;
use sensor_monitor::platform::SensorPlatform;
use sensor_monitor::sensors::{
    ALL_SENSORS, ChannelObserver, MonitorContext, SensorRegistry, UpdateStats,
};
use sensor_monitor::ui::{self, Command, SensorView};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// How often the observed update rate is refreshed.
const RATE_REFRESH: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "sensor-monitor")]
#[command(about = "Monitor simulated device sensors at a throttled rate")]
struct Args {
    /// Target sample rate in Hz (1-50)
    #[arg(long)]
    rate: Option<String>,

    /// Print the available sensors and exit
    #[arg(long)]
    list: bool,

    /// Print the sensor list as JSON (with --list)
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    config::load_dotenv();
    init_logger();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("Sensor monitor failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(rate) = args.rate.as_deref() {
        match parse_sample_rate(rate) {
            Some(hz) => config.monitor.target_hz = hz,
            None => warn!("Ignoring invalid --rate '{}'", rate),
        }
    }

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let platform = Arc::new(SimulatedPlatform::new(config.simulation.clone()));

    if args.list {
        let descriptors = platform.sensor_list();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        } else {
            for descriptor in &descriptors {
                println!("{}", descriptor.info());
            }
        }
        return Ok(());
    }

    info!("Starting sensor monitor");
    info!("  Target rate: {} Hz", config.monitor.target_hz);
    info!(
        "  One-shot trigger delay: {}-{} s",
        config.simulation.trigger_min_secs, config.simulation.trigger_max_secs
    );

    let stats = Arc::new(UpdateStats::new(config.update_target()));
    let context = Arc::new(
        MonitorContext::new(platform.clone(), Arc::new(SystemClock::new())).with_stats(stats),
    );
    let registry = SensorRegistry::new(context);

    let (observer, mut ui_rx) = ChannelObserver::channel();
    registry.notifier().register(observer);

    let mut view = SensorView::new(&registry, config.monitor.target_hz);

    let cancel = CancellationToken::new();
    let delivery = run_sensor_simulation(platform.clone(), cancel.clone());

    registry.enable_sensor(ALL_SENSORS);
    registry.start_sensors();

    print!("{}", view.render_table());
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut refresh = tokio::time::interval(RATE_REFRESH);

    loop {
        tokio::select! {
            Some(event) = ui_rx.recv() => {
                for line in view.handle_event(event, &registry) {
                    println!("{}", line);
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = line
                    .parse::<Command>()
                    .and_then(|command| ui::execute(command, &registry, &mut view));
                match reply {
                    Ok(reply) => {
                        for text in &reply.lines {
                            println!("{}", text);
                        }
                        if reply.quit {
                            break;
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            _ = refresh.tick() => {
                if let Some(hz) = view.refresh_observed_hz(registry.actual_update_interval()) {
                    println!("Actual: {} Hz", hz);
                }
            }
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Received shutdown signal"),
                    Err(e) => error!("Failed to listen for shutdown signal: {}", e),
                }
                break;
            }
        }
    }

    registry.stop_sensors();
    cancel.cancel();
    if let Err(e) = delivery.await {
        error!("Sensor delivery task failed: {}", e);
    }

    info!("Sensor monitor stopped");
    Ok(())
}
