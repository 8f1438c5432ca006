//! Western zodiac forecasts

use super::GenerationError;
use crate::inference::{InferenceClient, InferenceError, InferenceRequest};
use crate::prompts::horoscope_prompt;
use crate::schema::{string_at, text_at};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use xuanji_almanac::{ForecastPeriod, ZodiacSign};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoroscopeForecast {
    /// Chinese sign name, e.g. `狮子座`
    pub sign: String,
    pub period: ForecastPeriod,
    pub period_label: &'static str,
    pub date_range: &'static str,
    pub forecast: String,
    pub lucky_color: String,
    pub lucky_number: String,
}

pub struct HoroscopeGenerator {
    client: Arc<dyn InferenceClient>,
}

impl HoroscopeGenerator {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    /// Forecast for one sign and period
    ///
    /// The sign name and date range always come from the local table; the
    /// model supplies the forecast text and lucky color/number.
    pub async fn forecast(
        &self,
        sign: ZodiacSign,
        period: ForecastPeriod,
    ) -> Result<HoroscopeForecast, GenerationError> {
        if !self.client.has_credential() {
            return Err(InferenceError::MissingCredential.into());
        }

        let request = InferenceRequest::json_text(horoscope_prompt(sign, period), None);
        let reply = self.client.generate(request).await?.json()?;

        info!(sign = %sign, period = period.as_str(), "Horoscope generated");

        Ok(HoroscopeForecast {
            sign: sign.chinese_name().to_string(),
            period,
            period_label: period.chinese_label(),
            date_range: sign.date_range(),
            forecast: string_at(&reply, &["forecast"]).unwrap_or_default(),
            lucky_color: string_at(&reply, &["luckyColor"]).unwrap_or_default(),
            lucky_number: text_at(&reply, &["luckyNumber"]).unwrap_or_default(),
        })
    }
}
