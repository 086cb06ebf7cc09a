// Python-binding over JSON-grensesnittet. Kun med feature "python".
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::api::{fit_model_json, simulate_session_json};
use crate::error::CoreError;
use crate::parser::{parse_session, ParseContext};
use crate::telemetry::gather_text;
use crate::types::Sport;

fn to_py_err(e: CoreError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

#[pyfunction]
#[pyo3(signature = (request_json, cfg_json=None))]
fn fit_model(request_json: &str, cfg_json: Option<&str>) -> PyResult<String> {
    fit_model_json(request_json, cfg_json).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (request_json, cfg_json=None))]
fn simulate_session(request_json: &str, cfg_json: Option<&str>) -> PyResult<String> {
    simulate_session_json(request_json, cfg_json).map_err(to_py_err)
}

/// Parser økttekst uten å simulere; returnerer JSON med intervaller og
/// overhoppede linjer.
#[pyfunction]
fn parse_session_text(text: &str, sport: &str, base: f64) -> PyResult<String> {
    let sport = match sport.to_ascii_lowercase().as_str() {
        "cycling" | "bike" => Sport::Cycling,
        "running" | "run" => Sport::Running,
        other => {
            return Err(PyValueError::new_err(format!("ukjent idrett: {other}")));
        }
    };
    let parsed = parse_session(text, &ParseContext { sport, base });
    serde_json::to_string(&parsed).map_err(|e| to_py_err(e.into()))
}

#[pyfunction]
fn telemetry_text() -> String {
    gather_text()
}

#[pymodule]
fn conditioning_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(fit_model, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_session, m)?)?;
    m.add_function(wrap_pyfunction!(parse_session_text, m)?)?;
    m.add_function(wrap_pyfunction!(telemetry_text, m)?)?;
    Ok(())
}
