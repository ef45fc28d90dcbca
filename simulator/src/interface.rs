use std::io::{self, BufRead, Write};

use crate::scenarios::run_all::run_all;
use crate::scenarios::run_scenario;
use crate::scenarios::sweep_runner::ScenarioError;
use crate::simulation_registry::SimulationRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationType {
    CbrMobility,
    CbrNoMobility,
    BurstMobility,
    BurstNoMobility,
    BurstNoMobilityLarge,
    BurstShort,
    RunAll,
    Exit,
}

impl SimulationType {
    /// Scenario types in menu order
    pub const SCENARIOS: [SimulationType; 6] = [
        SimulationType::CbrMobility,
        SimulationType::CbrNoMobility,
        SimulationType::BurstMobility,
        SimulationType::BurstNoMobility,
        SimulationType::BurstNoMobilityLarge,
        SimulationType::BurstShort,
    ];

    pub fn from_input(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(SimulationType::CbrMobility),
            "2" => Some(SimulationType::CbrNoMobility),
            "3" => Some(SimulationType::BurstMobility),
            "4" => Some(SimulationType::BurstNoMobility),
            "5" => Some(SimulationType::BurstNoMobilityLarge),
            "6" => Some(SimulationType::BurstShort),
            "7" => Some(SimulationType::RunAll),
            "0" => Some(SimulationType::Exit),
            _ => None,
        }
    }
}

pub struct SimulatorInterface {
    registry: SimulationRegistry,
}

impl SimulatorInterface {
    pub fn new() -> Self {
        Self {
            registry: SimulationRegistry::new(),
        }
    }

    pub fn get_menu_text(&self) -> String {
        let mut text = String::from("Available scenarios:");
        for (index, config) in self.registry.scenarios().iter().enumerate() {
            text.push_str(&format!("\n  {}. {}", index + 1, config.name));
        }
        text.push_str(&format!("\n  {}. Run All Scenarios\n  0. Exit", SimulationType::SCENARIOS.len() + 1));
        text
    }

    pub fn show_menu(&self) {
        println!("=== Flow Statistics Simulator ===");
        println!("{}", self.get_menu_text());
    }

    /// Reads one menu choice; `None` for anything that is not a menu entry
    pub fn get_user_choice<R: BufRead>(&self, input: &mut R) -> io::Result<Option<SimulationType>> {
        print!("\nSelect scenario (0-{}): ", SimulationType::SCENARIOS.len() + 1);
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Some(SimulationType::Exit));
        }
        Ok(SimulationType::from_input(&line))
    }

    /// Shows the menu until a valid choice has been run
    pub fn run_interactive(&self) -> Result<(), ScenarioError> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        self.show_menu();
        loop {
            match self.get_user_choice(&mut input)? {
                Some(SimulationType::Exit) => {
                    println!("Exiting...");
                    return Ok(());
                }
                Some(SimulationType::RunAll) => return run_all(),
                Some(simulation_type) => {
                    if let Some(config) = self.registry.get(&simulation_type) {
                        run_scenario(config.scenario)?;
                        println!("{} completed successfully!", config.name);
                    }
                    return Ok(());
                }
                None => {
                    println!(
                        "Invalid choice. Please enter a number from 1 to {}, or 0 to exit.",
                        SimulationType::SCENARIOS.len() + 1
                    );
                    println!("{}", self.get_menu_text());
                }
            }
        }
    }
}

impl Default for SimulatorInterface {
    fn default() -> Self {
        Self::new()
    }
}
