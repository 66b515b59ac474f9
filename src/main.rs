//! Job Admission CLI
//!
//! Runs the admission checks against job or admission review files on disk.

use anyhow::{bail, Context, Result};
use job_admission::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() {
    let mut args: Vec<String> = std::env::args().collect();
    let program = if args.is_empty() {
        job_admission::NAME.to_string()
    } else {
        args.remove(0)
    };

    let config = match take_config(&mut args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };

    let level = config.log_level.as_deref().unwrap_or("warn");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.is_empty() {
        print_usage(&program);
        return;
    }

    let registry = Arc::new(InMemoryPluginRegistry::from_config(&config));

    let result = match args[0].as_str() {
        "validate" => validate_files(&args[1..], Validator::new(registry)),
        "review" => match args.get(1) {
            Some(path) => review_file(Path::new(path), &Validator::new(registry)),
            None => Err(anyhow::anyhow!("Please specify a review file")),
        },
        "plugins" => {
            list_plugins(&registry);
            Ok(true)
        }
        "help" | "--help" | "-h" => {
            print_usage(&program);
            Ok(true)
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(&program);
            Ok(false)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn print_usage(program: &str) {
    println!("Usage: {} [--config <file>] <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  validate <file|glob>...  Validate job files (JSON)");
    println!("  review <file>            Answer an admission review file (JSON)");
    println!("  plugins                  List registered job plugins");
    println!("  help                     Show this help message");
    println!();
    println!("Options:");
    println!("  --config <file>  TOML configuration (log level, extra plugins)");
}

/// Remove `--config <path>` from `args` and load it.
fn take_config(args: &mut Vec<String>) -> Result<AdmissionConfig> {
    let position = match args.iter().position(|a| a == "--config") {
        Some(position) => position,
        None => return Ok(AdmissionConfig::default()),
    };

    if position + 1 >= args.len() {
        bail!("--config needs a file path");
    }

    let path = args.remove(position + 1);
    args.remove(position);
    AdmissionConfig::load(&path).with_context(|| format!("loading config {}", path))
}

/// Expand glob patterns; plain paths pass through.
fn expand_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') {
            let matched: Vec<PathBuf> = glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern {}", pattern))?
                .filter_map(|entry| entry.ok())
                .collect();
            if matched.is_empty() {
                bail!("No job files found matching pattern: {}", pattern);
            }
            paths.extend(matched);
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

fn load_job(path: &Path) -> Result<Job> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("decoding job {}", path.display()))
}

fn validate_files(patterns: &[String], validator: Validator) -> Result<bool> {
    if patterns.is_empty() {
        bail!("Please specify at least one job file");
    }

    let paths = expand_paths(patterns)?;

    let verdicts: Vec<(PathBuf, Result<AdmissionResponse>)> = paths
        .into_par_iter()
        .map(|path| {
            let verdict = load_job(&path).map(|job| {
                let mut response = AdmissionResponse::default();
                validator.validate(&job, &mut response);
                response
            });
            (path, verdict)
        })
        .collect();

    let mut all_allowed = true;
    for (path, verdict) in &verdicts {
        match verdict {
            Ok(response) if response.allowed => {
                println!("✅ {}", path.display());
            }
            Ok(response) => {
                all_allowed = false;
                println!("❌ {}: {}", path.display(), response.result_message());
            }
            Err(e) => {
                all_allowed = false;
                println!("⚠️  {}: {:#}", path.display(), e);
            }
        }
    }

    log::info!("validated {} job file(s)", verdicts.len());
    Ok(all_allowed)
}

fn review_file(path: &Path, validator: &Validator) -> Result<bool> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let review = AdmissionReview::from_json(&content)
        .with_context(|| format!("decoding review {}", path.display()))?;

    let answer = respond(&review, validator);
    println!("{}", answer.to_json()?);

    Ok(answer.response.map(|r| r.allowed).unwrap_or(false))
}

fn list_plugins(registry: &InMemoryPluginRegistry) {
    println!("Registered plugins ({} total):", registry.len());
    for entry in registry.entries() {
        let origin = if entry.builtin { " (builtin)" } else { "" };
        if entry.description.is_empty() {
            println!("  • {}{}", entry.name, origin);
        } else {
            println!("  • {}{} - {}", entry.name, origin, entry.description);
        }
    }
}
