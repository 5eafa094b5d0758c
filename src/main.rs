use clap::Parser;
use clinic_des::stats::SimOutputs;
use clinic_des::{load_config, ClinicConfig, UrgentCareModel};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Seed used when neither the command line nor the configuration names one.
const DEFAULT_SEED: u64 = 1;

#[derive(Parser)]
#[command(name = "clinic-des")]
#[command(about = "Discrete-event simulation of an urgent-care clinic")]
struct Cli {
    /// TOML configuration file; the reference clinic is simulated without one
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed of the random source, overriding the configuration
    #[arg(long)]
    seed: Option<u64>,
    /// Write the trace of the replication to this file (turns tracing on and ends the run once the clinic drains)
    #[arg(long)]
    trace_file: Option<PathBuf>,
    /// Write one CSV row per departed patient to this file
    #[arg(long)]
    summary_csv: Option<PathBuf>,
    /// Print the summary as JSON instead of plain text
    #[arg(long)]
    json: bool,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| {
            tracing::error!("Failed to load config from '{}': {}", path.display(), e);
            e
        })?,
        None => ClinicConfig::default(),
    };
    if cli.summary_csv.is_some() {
        config.simulation.patient_summary = true;
    }
    if cli.trace_file.is_some() {
        config.simulation.trace_on = true;
        if !config.simulation.stop_when_drained {
            tracing::info!("Tracing requested, ending the run once the closed clinic is empty");
            config.simulation.stop_when_drained = true;
        }
    }
    let seed = cli.seed.or(config.simulation.seed).unwrap_or(DEFAULT_SEED);

    let model = UrgentCareModel::new(config)?;
    let replication = model.simulate(seed)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&replication.outputs.summary())?);
    } else {
        print_summary(&replication.outputs);
    }

    if let Some(path) = &cli.trace_file {
        replication.trace.write_to(BufWriter::new(File::create(path)?))?;
        tracing::info!("Trace written to {}", path.display());
    }
    if let Some(path) = &cli.summary_csv {
        replication.outputs.write_patient_summary(File::create(path)?)?;
        tracing::info!("Patient summary written to {}", path.display());
    }
    Ok(())
}

fn print_summary(outputs: &SimOutputs) {
    let show = |value: Option<f64>| value.map_or_else(|| "n/a".to_string(), |v| v.to_string());

    println!("Total patients arrived: {}", outputs.patients_arrived());
    println!("Total patients served: {}", outputs.patients_served());
    println!(
        "Patients received mental health consultation {}",
        outputs.patients_received_mh_consult()
    );
    println!();
    println!("Average patient time in system: {}", show(outputs.ave_time_in_system()));
    println!("Average patient waiting time: {}", show(outputs.ave_pcp_waiting_time()));
    println!("Average patient wait time for MHS: {}", show(outputs.ave_mh_waiting_time()));
}
