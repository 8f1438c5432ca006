//! Full chart pipeline: local skeleton plus model narrative

use super::chart_merger::{merge_narrative, ChartNarrative};
use super::GenerationError;
use crate::inference::{InferenceClient, InferenceError, InferenceRequest};
use crate::prompts::{chart_prompt, chart_schema};
use std::sync::Arc;
use tracing::{debug, info};
use xuanji_almanac::{build_chart, BirthInput, Chart, ChartOptions};

pub struct ChartInterpreter {
    client: Arc<dyn InferenceClient>,
    options: ChartOptions,
}

impl ChartInterpreter {
    pub fn new(client: Arc<dyn InferenceClient>, options: ChartOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Deterministic chart only; never calls the model
    pub fn skeleton(&self, input: &BirthInput) -> Result<Chart, GenerationError> {
        Ok(build_chart(input, &self.options)?)
    }

    /// Build a chart and annotate it with a model narrative
    ///
    /// **Algorithm:**
    /// 1. Fail with `MissingCredential` if no credential is configured
    /// 2. Compute the skeleton (input errors surface here, before any request)
    /// 3. Send one request carrying the locally computed facts and the schema
    /// 4. Parse the reply tolerantly and merge it onto the skeleton
    ///
    /// A reply that parses but lacks fields still yields a chart; only
    /// transport failures and non-JSON replies are errors.
    pub async fn interpret(&self, input: &BirthInput) -> Result<Chart, GenerationError> {
        if !self.client.has_credential() {
            return Err(InferenceError::MissingCredential.into());
        }

        let mut chart = self.skeleton(input)?;
        let request = InferenceRequest::json_text(chart_prompt(&chart), Some(chart_schema()));

        debug!(provider = self.client.name(), "Requesting chart narrative");
        let reply = self.client.generate(request).await?;
        let narrative = ChartNarrative::parse(&reply.json()?);
        merge_narrative(&mut chart, narrative);

        info!(
            day_master = %chart.day_master.stem,
            strength = %chart.strength_analysis.level,
            "Chart interpreted"
        );
        Ok(chart)
    }
}
