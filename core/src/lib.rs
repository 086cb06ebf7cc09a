//! Kjerne for CP/CS-kalkulator: modelltilpasning fra korte tester,
//! øktspråk og simulering av W′/D′-balanse.

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod fit;
pub mod metrics;
pub mod parser;
pub mod predict;
pub mod report;
pub mod simulate;
pub mod telemetry;
pub mod timefmt;
pub mod trials;
pub mod types;
pub mod zones;

#[cfg(feature = "python")]
mod py;

pub use api::{fit_model_json, simulate_session_json, FitRequest, FitResponse, SimulateRequest, SimulateResponse};
pub use config::EngineConfig;
pub use error::{CoreError, Result};
pub use fit::{fit_cycling, fit_model, fit_running, fit_three_parameter, fit_two_parameter};
pub use parser::{parse_session, ParseContext, ParsedSession};
pub use simulate::{generate_session, simulate, ReserveBalance, SimulationOptions};
pub use trials::{CyclingTrials, RunningTrials};
pub use types::*;
pub use zones::{classify, Zone};
