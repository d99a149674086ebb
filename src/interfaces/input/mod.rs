use anyhow;
use serde::{Deserialize, Serialize};

use crate::drivers::integral_evaluation::{IntegralEvaluationDriver, IntegralEvaluationParams};
use crate::drivers::MolintDriver;
use crate::interfaces::InputHandle;
use crate::io::format::{log_title, molint_error, molint_output};

#[cfg(test)]
#[path = "input_tests.rs"]
mod input_tests;

/// A structure containing molint input parameters which can be serialised into and deserialised
/// from a YAML input file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// Specification for integral evaluation: the molecule, the basis set, and the jobs.
    pub integral_evaluation: IntegralEvaluationParams,
}

impl InputHandle for Input {
    fn handle(&self) -> Result<(), anyhow::Error> {
        log_title("Molecular Integrals");
        molint_output!("");
        let mut driver = IntegralEvaluationDriver::builder()
            .parameters(&self.integral_evaluation)
            .build()?;
        driver.run().map_err(|err| {
            molint_error!("Integral evaluation failed: {err}");
            err
        })
    }
}
