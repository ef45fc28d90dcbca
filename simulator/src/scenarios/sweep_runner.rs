use chrono::Local;
use flowstats::report::summary_to_json;
use flowstats::utils::logging;
use flowstats::{ReportError, SweepController, SweepError, SweepOutcome, SweepProgress};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{ConfigError, ScenarioConfig};
use crate::network::SyntheticFlowSimulator;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Sweep failed: {0}")]
    Sweep(#[from] SweepError),
    #[error("Failed to write results: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to export summary: {0}")]
    Export(#[from] ReportError),
    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}

/// Writes every byte to two sinks
struct Tee<A: Write, B: Write> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

/// Runs the node-count sweep of one scenario and stores its report and JSON summary
pub struct SweepRunner {
    scenario_name: String,
    config_path: PathBuf,
    results_dir: PathBuf,
    echo_to_stdout: bool,
}

impl SweepRunner {
    pub fn new(scenario_name: &str, config_path: impl Into<PathBuf>, results_root: impl AsRef<Path>) -> Self {
        Self {
            scenario_name: scenario_name.to_string(),
            config_path: config_path.into(),
            results_dir: results_root.as_ref().join(scenario_name),
            echo_to_stdout: true,
        }
    }

    /// Keeps the report out of stdout, only writing the results files
    pub fn quiet(mut self) -> Self {
        self.echo_to_stdout = false;
        self
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn report_path(&self) -> PathBuf {
        self.results_dir.join("report.csv")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.results_dir.join("data").join("summary.json")
    }

    /// Runs the complete sweep
    pub fn run(&self) -> Result<SweepOutcome, ScenarioError> {
        // Create results directories if they don't exist
        self.create_directories()?;

        self.setup_logging();

        let config = ScenarioConfig::load(&self.config_path)?;
        let plan = config.sweep_plan();
        self.log_sweep_start(&config);

        println!("Running Sweep: {}", self.scenario_name);
        let progress_bar = self.create_progress_bar(plan.total_runs());

        let report_file = File::create(self.report_path())?;
        let mut simulator = SyntheticFlowSimulator::new(&config);
        let controller = SweepController::new(plan);
        let on_progress = |event: SweepProgress| match event {
            SweepProgress::ConfigurationStarted(point) => {
                progress_bar.set_message(format!(
                    "Configuration {}/{} with {} nodes",
                    point.index + 1,
                    controller.plan().num_configurations,
                    point.nodes
                ));
            }
            SweepProgress::RepetitionCompleted { .. } => progress_bar.inc(1),
            SweepProgress::ConfigurationCompleted(point) => {
                logging::log("SIMULATOR", &format!("Configuration with {} nodes complete", point.nodes));
            }
        };

        let result = if self.echo_to_stdout {
            let sink = Tee { first: report_file, second: io::stdout() };
            controller.run_with_progress(&mut simulator, sink, on_progress)
        } else {
            controller.run_with_progress(&mut simulator, report_file, on_progress)
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                progress_bar.abandon_with_message(format!("Sweep {} stopped: {}", self.scenario_name, e));
                logging::log("SIMULATOR", &format!("Sweep {} stopped: {}", self.scenario_name, e));
                return Err(e.into());
            }
        };
        progress_bar.finish_with_message(format!(
            "{} configurations of {} complete",
            outcome.configurations.len(),
            self.scenario_name
        ));
        println!("Sweep simulation complete");

        self.save_summary(&config, &outcome)?;

        logging::log("SIMULATOR", "=== Sweep Simulation Complete ===");
        logging::log(
            "SIMULATOR",
            &format!("Total configurations completed: {}", outcome.configurations.len()),
        );
        Ok(outcome)
    }

    fn create_directories(&self) -> Result<(), ScenarioError> {
        fs::create_dir_all(self.results_dir.join("data"))?;
        Ok(())
    }

    /// Sets up logging to the scenario log file if ENABLE_LOGS is set
    fn setup_logging(&self) {
        if env::var("ENABLE_LOGS").is_ok() {
            let log_path = self.results_dir.join("simulation.log");
            if let Err(e) = fs::remove_file(&log_path) {
                // Ignore error if file doesn't exist
                if e.kind() != io::ErrorKind::NotFound {
                    eprintln!("Error deleting log file: {}", e);
                }
            }

            env::set_var("FLOWSTATS_LOGGING", "true");
            env::set_var("FLOWSTATS_LOG_FILE", log_path);
            logging::init_logging();
        }
    }

    fn create_progress_bar(&self, total_runs: usize) -> ProgressBar {
        let progress_bar = ProgressBar::new(total_runs as u64);
        match ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}") {
            Ok(style) => progress_bar.set_style(style.progress_chars("+>-")),
            Err(e) => eprintln!("Progress bar template rejected: {}", e),
        }
        progress_bar
    }

    fn log_sweep_start(&self, config: &ScenarioConfig) {
        logging::log("SIMULATOR", &format!("=== Sweep {} Simulation ===", self.scenario_name));
        logging::log(
            "SIMULATOR",
            &format!("Start Time: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
        );
        logging::log("SIMULATOR", &format!("Traffic Pattern: {:?}", config.traffic.pattern));
        logging::log("SIMULATOR", &format!("Mobility: {}", config.traffic.mobility));
        logging::log("SIMULATOR", &format!("Start Nodes: {}", config.sweep.start_nodes));
        logging::log("SIMULATOR", &format!("Node Step: {}", config.sweep.node_step));
        logging::log("SIMULATOR", &format!("Configurations: {}", config.sweep.num_configurations));
        logging::log("SIMULATOR", &format!("Repetitions: {}", config.sweep.num_repetitions));
        logging::log("SIMULATOR", &format!("Duration: {} seconds", config.network.duration_seconds));
        logging::log("SIMULATOR", "================================");
    }

    /// Saves every configuration summary of the sweep as one JSON document
    fn save_summary(&self, config: &ScenarioConfig, outcome: &SweepOutcome) -> Result<(), ScenarioError> {
        let configurations = outcome
            .configurations
            .iter()
            .map(summary_to_json)
            .collect::<Result<Vec<_>, _>>()?;

        let summary = serde_json::json!({
            "scenario": self.scenario_name,
            "generated_at": Local::now().to_rfc3339(),
            "plan": config.sweep_plan(),
            "configurations": configurations,
        });

        let summary_path = self.summary_path();
        let mut file = File::create(&summary_path)?;
        file.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;
        logging::log(
            "SIMULATOR",
            &format!("Saved sweep summary to {}", summary_path.display()),
        );
        Ok(())
    }
}
