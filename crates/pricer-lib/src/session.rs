//! Presentation session: form values plus what the result region shows
//!
//! Nothing is computed until the user triggers a prediction. After a
//! trigger the result stays on screen, even when inputs change afterwards,
//! until the next successful trigger replaces it.

use crate::error::{FormError, PredictionError};
use crate::form::FormState;
use crate::models::PriceEstimate;
use crate::predictor::{result_line, Predictor};
use tracing::debug;

/// What the result region currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    /// No prediction has been triggered yet
    Idle,
    /// Latest successful estimate
    Result(PriceEstimate),
}

#[derive(Debug, Clone)]
pub struct Session {
    form: FormState,
    display: DisplayState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_form(FormState::new())
    }

    pub fn with_form(form: FormState) -> Self {
        Self {
            form,
            display: DisplayState::Idle,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Change one input; a shown result stays as it is
    pub fn set_input(&mut self, field: &str, raw: &str) -> Result<(), FormError> {
        self.form.set(field, raw)
    }

    /// Change several inputs, keeping every valid one
    pub fn apply<'a, I>(&mut self, submissions: I) -> Result<(), Vec<FormError>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.form.apply(submissions)
    }

    /// Assemble the record, predict, and show the result
    ///
    /// On failure the display is left exactly as it was.
    pub fn trigger(&mut self, predictor: &dyn Predictor) -> Result<PriceEstimate, PredictionError> {
        let record = self.form.record();
        let estimate = predictor.predict(&record)?;
        debug!(price = estimate.price, "Prediction displayed");
        self.display = DisplayState::Result(estimate.clone());
        Ok(estimate)
    }

    /// Text of the result region, if a price is shown
    pub fn result_text(&self) -> Option<String> {
        match &self.display {
            DisplayState::Idle => None,
            DisplayState::Result(estimate) => Some(result_line(estimate.price)),
        }
    }
}
