//! noshow: appointment no-show risk from the command line.
//!
//! A thin presentation layer over the library: it encodes the form
//! choices, hands the record to the prediction service, and prints the
//! probability with its risk band.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use noshow::adapters::sanitize::SanitizingMakeWriter;
use noshow::adapters::{JsonSchemaFile, LinearModel};
use noshow::application::{PredictionProgress, PredictionService, PredictionWorker};
use noshow::config::Settings;
use noshow::domain::appointment::parse_yes_no;
use noshow::domain::{AppointmentForm, Gender, RawInputRecord, RawValue, Shift};
use noshow::ports::SchemaSource;

#[derive(Debug, Parser)]
#[command(
    name = "noshow",
    version,
    about = "Predict the likelihood of a patient missing an appointment"
)]
struct Cli {
    /// Feature schema JSON (overrides NOSHOW_SCHEMA_PATH)
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// Exported model JSON (overrides NOSHOW_MODEL_PATH)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Reject fields the schema does not name
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assess no-show risk for one appointment
    Assess(AssessArgs),

    /// Run a regressor on named fields
    Forecast(ForecastArgs),

    /// Print the feature schema and its fingerprint
    Schema,
}

#[derive(Debug, Args)]
struct AssessArgs {
    #[arg(long, default_value_t = 35)]
    age: u32,

    /// male | female
    #[arg(long, default_value = "male")]
    gender: Gender,

    /// SMS reminder received: yes | no
    #[arg(long, default_value = "yes", value_parser = parse_yes_no)]
    sms: bool,

    /// Specialty code
    #[arg(long, default_value_t = 1)]
    specialty: u32,

    /// City code
    #[arg(long, default_value_t = 1)]
    place: u32,

    /// morning | afternoon | evening
    #[arg(long, default_value = "morning")]
    shift: Shift,
}

#[derive(Debug, Args)]
struct ForecastArgs {
    /// Field value as name=value (repeatable)
    #[arg(long = "field", value_parser = parse_field)]
    fields: Vec<(String, RawValue)>,
}

fn parse_field(s: &str) -> std::result::Result<(String, RawValue), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty field name in '{s}'"));
    }
    let value = value
        .parse::<RawValue>()
        .map_err(|e| format!("invalid value in '{s}': {e}"))?;
    Ok((name.to_string(), value))
}

fn init_logging(settings: &Settings) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // Logs on a terminal would interleave with the result; send them to a file there.
    let interactive = std::io::stdout().is_terminal();

    let (writer, guard) = if settings.log_mode.use_file(interactive) {
        if let Some(parent) = settings.log_file.parent() {
            // Best-effort: a missing directory surfaces on open below.
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)
            .with_context(|| format!("opening log file {}", settings.log_file.display()))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    Ok(guard)
}

fn load_service(settings: &Settings) -> Result<PredictionService<LinearModel>> {
    let schema = JsonSchemaFile::new(&settings.schema_path)
        .load_schema()
        .context("loading feature schema")?;
    let model = LinearModel::load(&settings.model_path).context("loading model")?;

    let service = PredictionService::new(Arc::new(schema), Arc::new(model))
        .context("model and schema disagree")?
        .with_strict_fields(settings.strict_fields);
    Ok(service)
}

fn run_assess(service: PredictionService<LinearModel>, args: AssessArgs) -> Result<()> {
    let form = AppointmentForm {
        age: args.age,
        gender: args.gender,
        sms_received: args.sms,
        specialty: args.specialty,
        place: args.place,
        shift: args.shift,
    };
    if let Err(errors) = form.validate() {
        anyhow::bail!("invalid appointment: {}", errors.join("; "));
    }

    let handle = PredictionWorker::spawn(Arc::new(service), form.to_record());
    while let Some(progress) = handle.recv() {
        match progress {
            PredictionProgress::Building => {}
            PredictionProgress::Predicting => eprintln!("Predicting no-show risk..."),
            PredictionProgress::Complete(assessment) => {
                println!("No-Show Probability: {:.2}%", assessment.percent());
                println!("{}: {}", assessment.category, assessment.category.description());
                return Ok(());
            }
            PredictionProgress::Failed(message) => anyhow::bail!(message),
        }
    }

    anyhow::bail!("prediction worker exited without a result")
}

fn run_forecast(service: &PredictionService<LinearModel>, args: ForecastArgs) -> Result<()> {
    let record: RawInputRecord = args.fields.into_iter().collect();
    let forecast = service.forecast(&record)?;
    println!("Forecast: {:.2}", forecast.value);
    Ok(())
}

fn run_schema(settings: &Settings) -> Result<()> {
    let schema = JsonSchemaFile::new(&settings.schema_path)
        .load_schema()
        .context("loading feature schema")?;

    println!("fingerprint {}", schema.fingerprint());
    for (index, slot) in schema.slots().iter().enumerate() {
        let mut line = format!(
            "{index:>3}  {:<24} {:<12} default={}",
            slot.name, slot.kind, slot.default
        );
        if slot.non_negative {
            line.push_str(" non-negative");
        }
        if let Some(levels) = slot.levels {
            line.push_str(&format!(" levels={levels}"));
        }
        println!("{line}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(path) = cli.schema {
        settings.schema_path = path;
    }
    if let Some(path) = cli.model {
        settings.model_path = path;
    }
    settings.strict_fields |= cli.strict;

    let _guard = init_logging(&settings)?;
    tracing::debug!("Settings: {:?}", settings);

    match cli.command {
        Command::Assess(args) => run_assess(load_service(&settings)?, args),
        Command::Forecast(args) => run_forecast(&load_service(&settings)?, args),
        Command::Schema => run_schema(&settings),
    }
}
