use anyhow::Context;
use flowstats::utils::logging;
use simulator::interface::SimulatorInterface;
use simulator::scenarios::{run_all::run_all, run_scenario};
use std::env;

// ------------------------------------------------------------------------------------------------
// Main
// ------------------------------------------------------------------------------------------------

/// Runs the scenario named on the command line, every scenario with `all`, or the menu
fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let scenario = env::args().nth(1);
    match scenario.as_deref() {
        None => SimulatorInterface::new()
            .run_interactive()
            .context("Interactive session failed")?,
        Some("all") => run_all().context("Running all scenarios failed")?,
        Some(name) => {
            let outcome = run_scenario(name).with_context(|| format!("Scenario {} failed", name))?;
            logging::log(
                "SIMULATOR",
                &format!("{} finished with {} configurations", name, outcome.configurations.len()),
            );
        }
    }
    Ok(())
}
