//! Headless clipdeck driver.
//!
//! Replays JSON session scripts against recording media and waveform
//! surfaces and reports the resulting state.

pub mod script;

pub use script::{load_script, parse_script, run_script, PolicyName, Report, Script, StepResult, ViewerStep};
