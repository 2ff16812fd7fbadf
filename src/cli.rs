use crate::{
    config::Config,
    eligibility,
    engine,
    input::validate_input,
    pipeline::{JobOutput, Pipeline},
    record::CourseRecord,
    util::{ensure_dir, hash_file, now_rfc3339, sha256_hex, stage_input},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "grad-check")]
#[command(about = "Extract transcript courses and check graduation eligibility")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./grad-check.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether the configured text engine is usable.
    Doctor {},
    /// Print the course records found in a transcript.
    Extract {
        #[arg(long)]
        input: PathBuf,
    },
    /// Extract, evaluate and write the job artifacts.
    Check {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Evaluate a records JSON file written by `check` or `extract`.
    Evaluate {
        #[arg(long)]
        records: PathBuf,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = if cfg_path.exists() {
        Config::load(&cfg_path)?
    } else {
        Config::default()
    };

    match &args.cmd {
        Command::Doctor {} => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            doctor(&cfg)
        }
        Command::Extract { input } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            extract(&cfg, input)
        }
        Command::Evaluate { records } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            evaluate(&cfg, records)
        }
        Command::Check { input, out_dir } => check(&args, &cfg, input, out_dir.as_deref()),
    }
}

fn resolve_config_path(user: Option<&Path>) -> PathBuf {
    if let Some(p) = user {
        return p.to_path_buf();
    }
    let default = PathBuf::from("grad-check.toml");
    if default.exists() {
        default
    } else {
        PathBuf::from("grad-check.example.toml")
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(cfg: &Config) -> Result<()> {
    let engine = engine::from_config(cfg)?;
    let diag = engine.doctor()?;
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn extract(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(cfg, input)?;
    let pipeline = Pipeline::new(cfg, engine::from_config(cfg)?)?;
    let out = pipeline.run_job(input)?;
    println!("{}", serde_json::to_string_pretty(&out.report.records)?);
    Ok(())
}

fn evaluate(cfg: &Config, records_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(records_path)
        .with_context(|| format!("reading records: {}", records_path.display()))?;
    let records: Vec<CourseRecord> =
        serde_json::from_str(&raw).with_context(|| "parsing records JSON")?;

    if records.is_empty() {
        println!("{}", crate::report::NO_RECORDS);
        return Ok(());
    }

    let verdict = eligibility::evaluate(&cfg.curriculum, &records);
    println!("{}", verdict.render());
    Ok(())
}

fn check(args: &Args, cfg: &Config, input: &Path, out_override: Option<&Path>) -> Result<()> {
    validate_input(cfg, input)?;

    let cfg_norm = cfg.normalized_for_hash();
    let cfg_hash = sha256_hex(cfg_norm.as_bytes());
    let input_hash =
        hash_file(input).with_context(|| format!("hashing input: {}", input.display()))?;
    let job_id = sha256_hex(format!("{}:{}", cfg_hash, input_hash).as_bytes());

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    let job_dir = out_root.join(&job_id);

    if job_dir.exists() && !cfg.global.resume {
        return Err(anyhow!(
            "job_dir already exists and resume=false: {}",
            job_dir.display()
        ));
    }

    ensure_dir(&job_dir)?;
    ensure_dir(&job_dir.join("final"))?;
    ensure_dir(&job_dir.join("logs"))?;

    let log_path = resolve_log_path(cfg, Some(&job_dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    info!("job_id={job_id} out={}", job_dir.display());

    if cfg.debug.dump_effective_config {
        let raw = toml::to_string(cfg).unwrap_or_default();
        std::fs::write(job_dir.join("effective-config.toml"), raw)?;
    }

    let source = if cfg.global.stage_inputs {
        let staged = stage_input(cfg, input)?;
        info!("staged input at {}", staged.display());
        staged
    } else {
        input.to_path_buf()
    };

    let pipeline = Pipeline::new(cfg, engine::from_config(cfg)?)?;

    let started = now_rfc3339();
    let result = pipeline.run_job(&source)?;
    write_artifacts(cfg, &job_dir, &result)?;

    if cfg.output.write_index_json {
        let index = serde_json::json!({
            "job_id": job_id,
            "started": started,
            "finished": now_rfc3339(),
            "records": format!("final/{}", cfg.output.records_filename),
            "report": format!("final/{}", cfg.output.report_filename),
            "report_text": format!("final/{}", cfg.output.report_text_filename),
        });
        std::fs::write(job_dir.join("index.json"), serde_json::to_string_pretty(&index)?)?;
    }

    println!("{}", result.report.render());

    if cfg.global.print_summary {
        let status = match &result.report.eligibility {
            None => "no_records",
            Some(e) if e.satisfied => "eligible",
            Some(_) => "not_eligible",
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "job_id": job_id,
                "job_dir": job_dir,
                "records": result.report.record_count,
                "status": status,
            }))?
        );
    }

    Ok(())
}

fn write_artifacts(cfg: &Config, job_dir: &Path, result: &JobOutput) -> Result<()> {
    let final_dir = job_dir.join("final");

    if cfg.output.write_records_json {
        std::fs::write(
            final_dir.join(&cfg.output.records_filename),
            serde_json::to_string_pretty(&result.report.records)?,
        )?;
    }

    if cfg.output.write_report_json {
        std::fs::write(
            final_dir.join(&cfg.output.report_filename),
            serde_json::to_string_pretty(&result.report)?,
        )?;
    }

    if cfg.output.write_report_text {
        std::fs::write(
            final_dir.join(&cfg.output.report_text_filename),
            result.report.render(),
        )?;
    }

    if cfg.debug.dump_normalized_text {
        std::fs::write(job_dir.join("normalized.txt"), &result.text)?;
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config, job_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    job_dir.map(|d| d.join("logs").join("grad-check.log"))
}
