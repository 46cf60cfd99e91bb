use clap::{ArgAction, Parser, Subcommand};
use hp_app::{
    AppError, AppResult, StudyOptions, StudyProgressEvent, StudyReport, StudyRequest,
    StudyResponse, SweepAxis,
};
use hp_core::units::to_degc;
use hp_results::{CaseId, CaseResult, ResultSeries};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hp-cli")]
#[command(about = "Heat pump design, off-design and dataset replay studies", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a study file
    Validate {
        /// Path to the study YAML or JSON file
        study_path: PathBuf,
    },
    /// Solve the design point only
    Design {
        /// Path to the study YAML or JSON file
        study_path: PathBuf,
    },
    /// Run the off-design sweeps of a study
    Sweep {
        /// Path to the study YAML or JSON file
        study_path: PathBuf,
        /// Sweep only this axis (repeatable)
        #[arg(long, value_parser = parse_axis)]
        axis: Vec<SweepAxis>,
    },
    /// Replay the study dataset against the design
    Replay {
        /// Path to the study YAML or JSON file
        study_path: PathBuf,
        /// Dataset to replay instead of the one in the study file
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Run design, every sweep and the replay
    Run {
        /// Path to the study YAML or JSON file
        study_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs of a study
    Runs {
        /// Path to the study YAML or JSON file
        study_path: PathBuf,
    },
    /// Export one result series of a run as CSV
    Export {
        /// Path to the study YAML or JSON file
        study_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Series name (design, replay, or a sweep axis)
        series: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_axis(name: &str) -> Result<SweepAxis, String> {
    SweepAxis::parse(name).ok_or_else(|| {
        let known: Vec<_> = SweepAxis::ALL.iter().map(|a| a.as_str()).collect();
        format!("unknown axis '{name}' (expected one of: {})", known.join(", "))
    })
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { study_path } => cmd_validate(&study_path),
        Commands::Design { study_path } => cmd_design(&study_path),
        Commands::Sweep { study_path, axis } => cmd_sweep(&study_path, axis),
        Commands::Replay {
            study_path,
            dataset,
        } => cmd_replay(&study_path, dataset),
        Commands::Run {
            study_path,
            no_cache,
        } => cmd_run(&study_path, !no_cache),
        Commands::Runs { study_path } => cmd_runs(&study_path),
        Commands::Export {
            study_path,
            run_id,
            series,
            output,
        } => cmd_export(&study_path, &run_id, &series, output.as_deref()),
    }
}

fn cmd_validate(study_path: &Path) -> AppResult<()> {
    println!("Validating study: {}", study_path.display());
    let study = hp_app::load_study(study_path)?;
    println!("✓ Study '{}' is valid", study.name);
    println!("  Sweeps: {}", study.sweeps.len());
    for sweep in &study.sweeps {
        println!("    {}", sweep.axis.as_str());
    }
    println!(
        "  Replay: {}",
        if study.replay.is_some() { "yes" } else { "no" }
    );
    Ok(())
}

fn cmd_design(study_path: &Path) -> AppResult<()> {
    let response = execute(
        study_path,
        StudyOptions {
            use_cache: false,
            axes: Some(Vec::new()),
            replay: false,
            ..StudyOptions::default()
        },
    )?;
    print_design(&response.report);
    Ok(())
}

fn cmd_sweep(study_path: &Path, axes: Vec<SweepAxis>) -> AppResult<()> {
    let response = execute(
        study_path,
        StudyOptions {
            axes: (!axes.is_empty()).then_some(axes),
            replay: false,
            ..StudyOptions::default()
        },
    )?;
    print_design(&response.report);
    if response.report.sweeps.is_empty() {
        println!("\nStudy defines no sweeps");
    }
    for series in &response.report.sweeps {
        print_series(series);
    }
    Ok(())
}

fn cmd_replay(study_path: &Path, dataset: Option<PathBuf>) -> AppResult<()> {
    let response = execute(
        study_path,
        StudyOptions {
            axes: Some(Vec::new()),
            replay: true,
            dataset,
            ..StudyOptions::default()
        },
    )?;
    print_design(&response.report);
    match &response.report.replay {
        Some(series) => print_series(series),
        None => {
            return Err(AppError::InvalidInput(
                "study defines no replay dataset; pass --dataset".to_string(),
            ));
        }
    }
    Ok(())
}

fn cmd_run(study_path: &Path, use_cache: bool) -> AppResult<()> {
    let response = execute(
        study_path,
        StudyOptions {
            use_cache,
            ..StudyOptions::default()
        },
    )?;
    print_design(&response.report);
    for series in &response.report.sweeps {
        print_summary(series);
    }
    if let Some(series) = &response.report.replay {
        print_summary(series);
    }
    Ok(())
}

fn execute(study_path: &Path, options: StudyOptions) -> AppResult<StudyResponse> {
    let request = StudyRequest {
        study_path,
        options,
    };

    let mut last_emit = Instant::now();
    let mut last_stage = String::new();
    let response = hp_app::run_study_with_progress(
        &request,
        Some(&mut |event| {
            let stage_key = event.stage.label().to_string();
            let emit_now = stage_key != last_stage || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = stage_key;
                last_emit = Instant::now();
            }
        }),
    );
    clear_progress_line();
    let response = response.inspect_err(|err| {
        if let AppError::Design(failure) = err {
            tracing::error!(reason = %failure.reason, "design point failed: {}", failure.message);
        }
    })?;
    tracing::info!(
        run_id = %response.run_id,
        cached = response.loaded_from_cache,
        "study finished"
    );

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Study completed: {}", response.run_id);
    }
    Ok(response)
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &StudyProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(case) = &event.case {
        match case.total {
            Some(total) => line.push_str(&format!("  case {}/{}", case.index + 1, total)),
            None => line.push_str(&format!("  record {}", case.index + 1)),
        }
        line.push_str(&format!("  {}", case.status));
    }
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn print_design(report: &StudyReport) {
    let m = &report.design;
    println!("\nDesign point of '{}':", report.study_name);
    println!("  COP:              {:.3}", m.cop);
    println!("  Compressor power: {:.1} kW", m.compressor_power_w / 1e3);
    println!("  Evaporator duty:  {:.1} kW", m.evaporator_duty_w / 1e3);
    println!("  Condenser duty:   {:.1} kW", m.condenser_duty_w / 1e3);

    let Some(state) = &report.design_state else {
        return;
    };
    let perf = state.performance();
    println!(
        "  Refrigerant flow: {:.4} kg/s",
        perf.refrigerant_mass_flow.value
    );
    println!("  Source flow:      {:.2} kg/s", perf.source_mass_flow.value);
    println!("  Sink flow:        {:.3} kg/s", perf.sink_mass_flow.value);
    println!(
        "  Solver:           {} iterations, residual {:.3e}",
        state.diagnostics().iterations,
        state.diagnostics().residual_norm
    );

    println!(
        "\n  {:<14} {:>10} {:>9} {:>12} {:>8}",
        "connection", "p [bar]", "T [°C]", "h [kJ/kg]", "x [-]"
    );
    for node in state.nodes() {
        let s = &node.state;
        let quality = s
            .quality()
            .map_or_else(|| "-".to_string(), |x| format!("{x:.3}"));
        println!(
            "  {:<14} {:>10.4} {:>9.2} {:>12.1} {:>8}",
            node.name,
            s.pressure().value / 1e5,
            to_degc(s.temperature()),
            s.enthalpy() / 1e3,
            quality
        );
    }
}

fn print_summary(series: &ResultSeries) {
    let summary = series.summary();
    print!(
        "\n{}: {} cases, {} converged, {} failed",
        series.name(),
        summary.total,
        summary.converged,
        summary.failed()
    );
    if let Some((lo, hi)) = summary.cop_range {
        print!(", COP {lo:.3} to {hi:.3}");
    }
    println!();
}

fn print_series(series: &ResultSeries) {
    print_summary(series);
    println!(
        "  {:<28} {:<14} {:>7} {:>10} {:>10}",
        "case", "status", "COP", "P [kW]", "Qcd [kW]"
    );
    for case in series {
        match case.metrics() {
            Some(m) => println!(
                "  {:<28} {:<14} {:>7.3} {:>10.1} {:>10.1}",
                case.case().to_string(),
                case.status().as_str(),
                m.cop,
                m.compressor_power_w / 1e3,
                m.condenser_duty_w / 1e3
            ),
            None => println!(
                "  {:<28} {:<14} {}",
                case.case().to_string(),
                case.status().as_str(),
                case.message().unwrap_or("")
            ),
        }
    }
}

fn cmd_runs(study_path: &Path) -> AppResult<()> {
    let runs = hp_app::list_runs(study_path)?;

    if runs.is_empty() {
        println!("No cached runs found for {}", study_path.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            let series: Vec<_> = manifest
                .series
                .iter()
                .map(|s| format!("{} {}/{}", s.name, s.converged, s.cases))
                .collect();
            println!(
                "  {} ({})  {}",
                manifest.run_id,
                manifest.timestamp,
                series.join(", ")
            );
        }
    }
    Ok(())
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

fn csv_row(case: &CaseResult) -> String {
    let (index, value, timestamp) = match case.case() {
        CaseId::Design => (String::new(), String::new(), String::new()),
        CaseId::Perturbation { index, value } => {
            (index.to_string(), value.to_string(), String::new())
        }
        CaseId::Timestep { index, timestamp } => (
            index.to_string(),
            String::new(),
            timestamp.clone().unwrap_or_default(),
        ),
    };
    let metrics = case.metrics().map_or_else(
        || ",,,".to_string(),
        |m| {
            format!(
                "{},{},{},{}",
                m.cop,
                m.compressor_power_w / 1e3,
                m.evaporator_duty_w / 1e3,
                m.condenser_duty_w / 1e3
            )
        },
    );
    format!(
        "{},{},{},{},{},{}\n",
        index,
        value,
        csv_field(&timestamp),
        case.status(),
        metrics,
        csv_field(case.message().unwrap_or(""))
    )
}

fn cmd_export(
    study_path: &Path,
    run_id: &str,
    series_name: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let series = hp_app::load_series(study_path, run_id, series_name)?;
    tracing::info!(run_id, series = series_name, cases = series.len(), "exporting series");

    let mut csv = String::from(
        "index,value,timestamp,status,cop,compressor_power_kw,evaporator_duty_kw,condenser_duty_kw,message\n",
    );
    for case in &series {
        csv.push_str(&csv_row(case));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!("✓ Exported {} cases to {}", series.len(), path.display());
    } else {
        print!("{}", csv);
    }

    Ok(())
}
