use std::{error::Error, fs, path::Path, path::PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use pitchmap_core::{HotMask, Real};
use pitchmap_pipeline::{
    load_predictions, mat3_to_rows, prepare_predictions, write_prepared, PitchTemplate,
    PrepareOptions,
};
use pitchmap_poi::{find_optimal_poi, PoiConfig};
use serde::Serialize;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Optimal point-of-interest selection for pitch homographies.
#[derive(Debug, Parser)]
#[command(name = "pitchmap", author, version, about)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Select the optimal PoI of one frame and print the result as JSON.
    Optimal {
        /// Template JSON (unit-square landmarks).
        #[arg(long)]
        template: PathBuf,
        /// Prediction JSON keyed by frame id.
        #[arg(long)]
        predictions: PathBuf,
        /// Frame id to process.
        #[arg(long)]
        frame: String,
        /// Optional JSON PoiConfig. Defaults are used if omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run PoI selection over a prediction file and write the prepared JSON.
    Prepare {
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        predictions: PathBuf,
        /// Output path for the prepared predictions.
        #[arg(long)]
        out: PathBuf,
        /// Process only the first N frames.
        #[arg(long)]
        limit: Option<usize>,
        /// Optional JSON PoiConfig. Defaults are used if omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct StepReport {
    removed: usize,
    error: Real,
}

#[derive(Debug, Serialize)]
struct OptimalReport {
    frame: String,
    /// One flag per template landmark.
    mask: HotMask,
    /// Indices of the hot landmarks.
    hot: Vec<usize>,
    homography: [[Real; 3]; 3],
    error: Real,
    steps: Vec<StepReport>,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}

fn load_config(path: Option<&Path>) -> CliResult<PoiConfig> {
    match path {
        Some(path) => load_json_file(path),
        None => Ok(PoiConfig::default()),
    }
}

fn run_optimal(
    template_path: &Path,
    predictions_path: &Path,
    frame: &str,
    config_path: Option<&Path>,
) -> CliResult<String> {
    let config = load_config(config_path)?;
    let template = PitchTemplate::load(template_path, None)?;
    let predictions = load_predictions(predictions_path)?;
    let prediction = predictions
        .get(frame)
        .ok_or_else(|| format!("frame {frame} not found in {}", predictions_path.display()))?;
    prediction.check_len(template.len())?;

    let optimal = find_optimal_poi(
        &prediction.template_to_observed()?,
        &prediction.points(),
        template.points(),
        &config,
    )?;
    let report = OptimalReport {
        frame: frame.to_string(),
        hot: optimal.hot.hot_indices().collect(),
        mask: optimal.hot,
        homography: mat3_to_rows(&optimal.homography),
        error: optimal.error,
        steps: optimal
            .steps
            .iter()
            .map(|s| StepReport {
                removed: s.removed,
                error: s.error,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn run_prepare(
    template_path: &Path,
    predictions_path: &Path,
    out: &Path,
    limit: Option<usize>,
    config_path: Option<&Path>,
) -> CliResult<usize> {
    let options = PrepareOptions {
        poi: load_config(config_path)?,
        limit,
    };
    let template = PitchTemplate::load(template_path, None)?;
    let predictions = load_predictions(predictions_path)?;

    let report = prepare_predictions(&template, &predictions, &options)?;
    write_prepared(out, &report.frames)?;
    info!(
        "wrote {} frames to {} ({} skipped)",
        report.frames.len(),
        out.display(),
        report.skipped.len()
    );
    Ok(report.frames.len())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Optimal {
            template,
            predictions,
            frame,
            config,
        } => {
            let json = run_optimal(&template, &predictions, &frame, config.as_deref())?;
            println!("{json}");
        }
        Command::Prepare {
            template,
            predictions,
            out,
            limit,
            config,
        } => {
            run_prepare(&template, &predictions, &out, limit, config.as_deref())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pitchmap_core::{synthetic::pitch, Mat3};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn write_json(value: &Value, path: &Path) {
        serde_json::to_writer_pretty(fs::File::create(path).unwrap(), value).unwrap();
    }

    /// Template and a single exact prediction whose stored homography is
    /// the symmetric-space inverse of a broadcast view.
    fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let template = pitch::pitch_template();
        let points: Vec<Value> = template
            .iter()
            .map(|p| json!({"coords": [p.x, p.y]}))
            .collect();
        let template_path = dir.path().join("template.json");
        write_json(&json!({"ranges": [1.0, 1.0], "points": points}), &template_path);

        let h = pitch::broadcast_homography(1.3);
        let to_sym = Mat3::new(2.0, 0.0, -1.0, 0.0, 2.0, -1.0, 0.0, 0.0, 1.0);
        let from_sym = Mat3::new(0.5, 0.0, 0.5, 0.0, 0.5, 0.5, 0.0, 0.0, 1.0);
        let stored = (to_sym * h * from_sym).try_inverse().unwrap();
        let poi: Vec<[f64; 2]> = template
            .iter()
            .map(|p| {
                let q = pitchmap_core::transform_point(&h, p, false);
                [q.x, q.y]
            })
            .collect();
        let preds_path = dir.path().join("preds.json");
        write_json(
            &json!({"f1": {"poi": poi, "theta": mat3_to_rows(&stored), "score": 1.0}}),
            &preds_path,
        );
        (dir, template_path, preds_path)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_prepare_arguments() {
        let cli = Cli::try_parse_from([
            "pitchmap", "-vv", "prepare", "--template", "t.json", "--predictions", "p.json",
            "--out", "o.json", "--limit", "23",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Prepare { limit: Some(23), .. }));
    }

    #[test]
    fn optimal_reports_reduced_mask() {
        let (dir, template_path, preds_path) = fixture();
        let config_path = dir.path().join("config.json");
        write_json(&json!({"target_count": 6}), &config_path);

        let json = run_optimal(&template_path, &preds_path, "f1", Some(&config_path)).unwrap();
        let report: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(report["frame"], "f1");
        assert_eq!(report["hot"].as_array().unwrap().len(), 6);
        let mask = report["mask"].as_array().unwrap();
        assert_eq!(mask.len(), pitch::PITCH_POINT_COUNT);
        assert_eq!(mask.iter().filter(|v| v.as_bool() == Some(true)).count(), 6);
        assert!(report["error"].as_f64().unwrap() < 1e-6);
    }

    #[test]
    fn unknown_frame_is_an_error() {
        let (_dir, template_path, preds_path) = fixture();
        let err = run_optimal(&template_path, &preds_path, "missing", None).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn prepare_writes_output_file() {
        let (dir, template_path, preds_path) = fixture();
        let out = dir.path().join("out").join("preds.json");
        let written = run_prepare(&template_path, &preds_path, &out, None, None).unwrap();
        assert_eq!(written, 1);

        let data: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let poi = data["f1"]["poi"].as_array().unwrap();
        let cold = poi.iter().filter(|p| p[0] == -1.0 && p[1] == -1.0).count();
        assert_eq!(poi.len() - cold, 5);
    }
}
