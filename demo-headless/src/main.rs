use chrono::{Duration, Utc};
use clap::Parser;
use pmi_core::{
    back_calculate, estimate_hours_since_death, CaseMetadata, CorrectionContext, LifeStage,
    Location, PmiError, Report, SelfHeating, SelfHeatingPolicy, SoilCorrection, SpeciesTable,
    SyntheticWeather, ThermalEvent, TimeRange, WeatherProvider,
};

/// PMI back-calculation demo with synthetic weather
#[derive(Parser, Debug)]
#[command(name = "pmi-demo")]
#[command(about = "Forensic PMI estimation demo (ADH back-calculation)", long_about = None)]
struct Args {
    /// Species id (lucilia_sericata, lucilia_sericata_busan, chrysomya_megacephala)
    #[arg(short, long, default_value = "lucilia_sericata_busan")]
    species: String,

    /// Observed life stage (egg, instar_1, instar_2, instar_3_feed, instar_3_wander, pupa, adult)
    #[arg(long, default_value = "instar_3_feed")]
    stage: String,

    /// Hours of weather history before discovery
    #[arg(long, default_value_t = 500)]
    hours_back: i64,

    /// Baseline temperature in °C
    #[arg(short, long, default_value_t = 22.0)]
    base_temp: f32,

    /// Diurnal amplitude in °C (peak elevation at 14:00)
    #[arg(long, default_value_t = 5.0)]
    diurnal_amplitude: f32,

    /// Weather jitter half-width in °C
    #[arg(long, default_value_t = 0.0)]
    jitter: f32,

    /// RNG seed for weather jitter
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Growth-rate multiplier (drug/chemical correction)
    #[arg(short = 'm', long, default_value_t = 1.0)]
    multiplier: f32,

    /// Maximum maggot-mass heating in °C (0 disables)
    #[arg(long, default_value_t = 0.0)]
    max_heat: f32,

    /// Self-heating policy (stage-curve, flat)
    #[arg(long, default_value = "stage-curve")]
    heat_policy: String,

    /// Solar exposure delta in °C (positive sun, negative shade)
    #[arg(long, default_value_t = 0.0)]
    sun: f32,

    /// Burial depth in cm (0 = surface remains)
    #[arg(long, default_value_t = 0.0)]
    soil_depth: f32,

    /// Directly measured soil temperature in °C (overrides ambient)
    #[arg(long)]
    soil_temp: Option<f32>,

    /// Event temperature delta in °C (requires --event-duration)
    #[arg(long)]
    event_delta: Option<f32>,

    /// Event duration in hours
    #[arg(long, default_value_t = 0.0)]
    event_duration: f32,

    /// Hours before discovery at which the event ended
    #[arg(long, default_value_t = 0.0)]
    event_end: f32,

    /// Rectal temperature in °C (enables the cooling cross-check)
    #[arg(long)]
    rectal_temp: Option<f32>,

    /// Ambient temperature at the scene for the cooling model in °C
    #[arg(long, default_value_t = 20.0)]
    scene_temp: f32,

    /// Body mass in kg
    #[arg(long, default_value_t = 70.0)]
    body_mass: f32,

    /// Clothing/insulation correction factor
    #[arg(long, default_value_t = 1.0)]
    clothing: f32,

    /// Case identifier for the report
    #[arg(long, default_value = "demo-case")]
    case_id: String,

    /// Write the full JSON report to this path
    #[arg(short = 'o', long)]
    report_out: Option<std::path::PathBuf>,

    /// Print the full trace sheet instead of an excerpt
    #[arg(long)]
    full_trace: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    println!("=== Forensic PMI Estimation Demo ===\n");

    let table = SpeciesTable::builtin();
    let profile = match table.get(&args.species) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("known species:");
            for id in table.species_ids() {
                eprintln!("  {id}");
            }
            std::process::exit(1);
        }
    };
    let Some(stage) = LifeStage::parse(&args.stage) else {
        eprintln!("error: unknown life stage '{}'", args.stage);
        std::process::exit(1);
    };

    let policy = match args.heat_policy.to_lowercase().as_str() {
        "flat" | "flat-threshold" => SelfHeatingPolicy::FlatThreshold,
        _ => SelfHeatingPolicy::StageCurve,
    };

    let ctx = CorrectionContext {
        soil: (args.soil_depth > 0.0 || args.soil_temp.is_some()).then_some(SoilCorrection {
            measured_temp_c: args.soil_temp,
            depth_cm: args.soil_depth,
        }),
        self_heating: SelfHeating {
            max_delta_c: args.max_heat,
            policy,
        },
        solar_delta_c: args.sun,
        event: args.event_delta.map(|delta| ThermalEvent {
            temp_delta_c: delta,
            duration_h: args.event_duration,
            end_hours_before_discovery: args.event_end,
        }),
        growth_rate_multiplier: args.multiplier,
        ..CorrectionContext::default()
    };

    // Synthetic hourly history ending now
    let provider = SyntheticWeather {
        base_temp_c: args.base_temp,
        diurnal_amplitude_c: args.diurnal_amplitude,
        jitter_c: args.jitter,
        seed: args.seed,
    };
    let end = Utc::now();
    let range = TimeRange {
        start: end - Duration::hours(args.hours_back),
        end,
    };
    let series = match provider.fetch(Location::busan(), range) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "Generated {} hourly samples ({} h history, base {:.1} °C)",
        series.len(),
        args.hours_back,
        args.base_temp
    );
    println!("Analyzing {} at stage '{}'\n", profile.display_name, stage.name());

    let estimate = match back_calculate(profile, stage, &series, &ctx) {
        Ok(est) => {
            println!("Estimated onset:   {}", est.onset_time.format("%Y-%m-%d %H:%M UTC"));
            println!("Hours before discovery: {:.1}", est.hours_before_discovery);
            println!(
                "Accumulated ADH:   {:.1} (target {:.1})",
                est.total_adh, est.target_adh
            );
            Some(est)
        }
        Err(PmiError::InsufficientHistory {
            accumulated_adh,
            target_adh,
        }) => {
            println!(
                "No estimate: history window too short ({accumulated_adh:.1} of {target_adh:.1} ADH)"
            );
            None
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let cooling = args.rectal_temp.map(|rectal| {
        match estimate_hours_since_death(rectal, args.scene_temp, args.body_mass, args.clothing) {
            Ok(est) => {
                println!(
                    "\nCooling cross-check: {:.1} h since death (± {:.1} h)",
                    est.hours, est.confidence_h
                );
                est
            }
            Err(e) => {
                eprintln!("cooling estimate failed: {e}");
                std::process::exit(1);
            }
        }
    });

    let report = Report::assemble(
        CaseMetadata {
            case_id: args.case_id.clone(),
            investigator: String::new(),
            location_name: "synthetic".to_string(),
        },
        profile,
        stage,
        ctx,
        estimate,
        cooling,
    );

    if let Some(est) = &report.estimate {
        println!("\n--- Trace {} ---", if args.full_trace { "(full)" } else { "(excerpt)" });
        let shown: Vec<_> = if args.full_trace {
            est.trace.iter().collect()
        } else {
            est.trace.iter().take(5).collect()
        };
        for r in shown {
            println!(
                "{}  base {:5.1} °C  eff {:5.1} °C  +{:6.1} ADH  total {:8.1}{}{}",
                r.time.format("%m-%d %H:%M"),
                r.base_temp_c,
                r.effective_temp_c,
                r.contribution_adh,
                r.accumulated_adh,
                if r.overheated { "  [overheated]" } else { "" },
                if r.event_active { "  [event]" } else { "" },
            );
        }
        if !args.full_trace && est.trace.len() > 5 {
            println!("... {} more records (use --full-trace)", est.trace.len() - 5);
        }
    }

    if let Some(path) = &args.report_out {
        match report.to_json() {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    eprintln!("failed to write report: {e}");
                    std::process::exit(1);
                }
                println!("\nReport written to {}", path.display());
            }
            Err(e) => {
                eprintln!("failed to serialize report: {e}");
                std::process::exit(1);
            }
        }
    }
}
