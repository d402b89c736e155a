//! cncforge CLI - toolpath extraction and program optimization

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use cncforge::output::dated_output_path;
use cncforge::{
    init_logging, optimize_for, Config, Controller, Preset, SettingsPersistence, Toolpath,
    BUILD_DATE, VERSION,
};

#[derive(Parser)]
#[command(name = "cncforge")]
#[command(
    about = "G-code toolpath extraction and controller-aware optimization",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a program into its toolpath
    Toolpath {
        /// G-code program to read
        file: PathBuf,
        /// Target length of one interpolated arc segment
        #[arg(short, long)]
        resolution: Option<f64>,
        /// Print the full point list as JSON
        #[arg(long)]
        json: bool,
        /// Config file (.toml or .json); defaults to the user config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Rewrite a program for a controller
    Optimize {
        /// G-code program to read
        file: PathBuf,
        /// Target controller (fanuc, heidenhain, siemens, haas, mazak, okuma, generic)
        #[arg(short = 'C', long)]
        controller: Option<String>,
        /// Preset (basic, speed, quality, advanced)
        #[arg(short, long)]
        preset: Option<String>,
        /// Config file (.toml or .json); defaults to the user config
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the program to this file
        #[arg(short, long, conflicts_with = "save_dir")]
        output: Option<PathBuf>,
        /// Write a dated file into this directory
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    /// List the optimization presets
    Presets,
}

fn main() -> Result<()> {
    init_logging()?;
    tracing::debug!("cncforge {} (built {})", VERSION, BUILD_DATE);

    let cli = Cli::parse();

    match cli.command {
        Commands::Toolpath {
            file,
            resolution,
            json,
            config,
        } => {
            show_toolpath(&file, resolution, json, config.as_deref())?;
        }
        Commands::Optimize {
            file,
            controller,
            preset,
            config,
            output,
            save_dir,
        } => {
            let request = OptimizeRequest {
                controller,
                preset,
                output,
                save_dir,
            };
            optimize_file(&file, request, config.as_deref())?;
        }
        Commands::Presets => {
            for preset in Preset::ALL {
                println!("{:<10} {}", preset.name(), preset.description());
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    match Config::default_path() {
        Ok(path) => Ok(SettingsPersistence::open(path)?.into_config()),
        Err(err) => {
            tracing::warn!("{}; using default settings", err);
            Ok(Config::default())
        }
    }
}

fn read_program(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn show_toolpath(
    file: &Path,
    resolution: Option<f64>,
    json: bool,
    config: Option<&Path>,
) -> Result<()> {
    let mut settings = load_config(config)?;
    if let Some(resolution) = resolution {
        settings.toolpath.arc_resolution = resolution;
        settings.validate()?;
    }

    let program = read_program(file)?;
    let toolpath = Toolpath::assemble(&program, &settings.toolpath)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&toolpath.points)?);
    } else {
        println!("{} points", toolpath.len());
        if let Some((min, max)) = toolpath.bounds() {
            println!(
                "bounds X {:.3}..{:.3} Y {:.3}..{:.3} Z {:.3}..{:.3}",
                min.x, max.x, min.y, max.y, min.z, max.z
            );
        }
    }
    for warning in &toolpath.warnings {
        eprintln!("warning: {}", warning);
    }

    Ok(())
}

struct OptimizeRequest {
    controller: Option<String>,
    preset: Option<String>,
    output: Option<PathBuf>,
    save_dir: Option<PathBuf>,
}

fn optimize_file(file: &Path, request: OptimizeRequest, config: Option<&Path>) -> Result<()> {
    let settings = load_config(config)?;

    let controller: Controller = match &request.controller {
        Some(name) => name.parse()?,
        None => settings.optimizer.controller,
    };
    let preset: Preset = match &request.preset {
        Some(name) => name.parse()?,
        None => settings.optimizer.preset,
    };
    let options = settings.options_for(controller, preset)?;

    let program = read_program(file)?;
    let result = optimize_for(&program, controller, &options)?;

    let destination = match (request.output, request.save_dir) {
        (Some(path), _) => Some(path),
        (None, Some(dir)) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            Some(dated_output_path(&dir, file, controller))
        }
        (None, None) => None,
    };

    match destination {
        Some(path) => {
            fs::write(&path, &result.optimized_code)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", result.optimized_code),
    }

    let stats = &result.stats;
    eprintln!(
        "{} -> {} lines ({:.1}% smaller, ~{:.1}s saved)",
        stats.original_lines,
        stats.optimized_lines,
        stats.reduction_percent,
        stats.estimated_time_reduction
    );
    for improvement in &result.improvements {
        eprintln!("  + {}", improvement);
    }
    for warning in &result.validation.warnings {
        eprintln!("warning: {}", warning);
    }
    for error in &result.validation.errors {
        eprintln!("error: {}", error);
    }
    if !result.validation.is_valid {
        anyhow::bail!("optimized program failed the safety check");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROGRAM: &str = "\
G21 G90 G17
G0 X0 Y0 Z5
G1 Z-1 F300
G1 X20 Y0
G2 X40 Y0 I10 J0
G0 Z5
M30
";

    fn workspace() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let program = dir.path().join("job.nc");
        fs::write(&program, PROGRAM).unwrap();

        let config_path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.toolpath.arc_resolution = 1.0;
        config.optimizer.controller = Controller::Fanuc;
        config.optimizer.preset = Preset::Speed;
        config.save_to_file(&config_path).unwrap();

        (dir, program, config_path)
    }

    #[test]
    fn test_config_resolution_reaches_toolpath() {
        let (_dir, _program, config_path) = workspace();
        let config = load_config(Some(&config_path)).unwrap();

        let fine = Toolpath::assemble(PROGRAM, &config.toolpath).unwrap();
        let coarse = Toolpath::assemble(PROGRAM, &Default::default()).unwrap();
        assert!(fine.len() > coarse.len());
    }

    #[test]
    fn test_optimize_file_writes_dated_output() {
        let (dir, program, config_path) = workspace();
        let out_dir = dir.path().join("out");
        let request = OptimizeRequest {
            controller: None,
            preset: None,
            output: None,
            save_dir: Some(out_dir.clone()),
        };

        optimize_file(&program, request, Some(&config_path)).unwrap();

        let written: Vec<PathBuf> = fs::read_dir(&out_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(written.len(), 1);
        let name = written[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("job_fanuc_"));
        assert!(name.ends_with(".nc"));
        assert!(!fs::read_to_string(&written[0]).unwrap().is_empty());
    }

    #[test]
    fn test_optimize_file_explicit_output() {
        let (dir, program, config_path) = workspace();
        let output = dir.path().join("rewritten.h");
        let request = OptimizeRequest {
            controller: Some("heidenhain".to_string()),
            preset: Some("advanced".to_string()),
            output: Some(output.clone()),
            save_dir: None,
        };

        optimize_file(&program, request, Some(&config_path)).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("BEGIN PGM"));
    }

    #[test]
    fn test_unknown_controller_fails() {
        let (_dir, program, config_path) = workspace();
        let request = OptimizeRequest {
            controller: Some("brother".to_string()),
            preset: None,
            output: None,
            save_dir: None,
        };
        assert!(optimize_file(&program, request, Some(&config_path)).is_err());
    }

    #[test]
    fn test_bad_resolution_is_rejected() {
        let (_dir, program, config_path) = workspace();
        assert!(show_toolpath(&program, Some(0.0), false, Some(&config_path)).is_err());
    }
}
