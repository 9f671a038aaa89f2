use std::sync::Arc;

use serde::Serialize;

use crate::data::{Dataset, RowRecord};
use crate::error::InsightError;
use crate::state::AppState;

/// Rows embedded in the prompt; larger datasets are truncated.
pub const MAX_PROMPT_ROWS: usize = 100;

/// Chart type reported for every 3D variant.
pub const CHART_TYPE_3D: &str = "3D";

/// Inputs captured from the UI at the moment insights are requested.
#[derive(Debug, Clone)]
pub struct InsightRequest {
    pub dataset: Option<Arc<Dataset>>,
    pub chart_type: String,
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
}

impl InsightRequest {
    pub fn from_state(state: &AppState) -> Self {
        let chart_type = if state.chart.is_3d() {
            CHART_TYPE_3D.to_string()
        } else {
            state.chart.kind_2d.key().to_string()
        };
        Self {
            dataset: state.dataset.clone(),
            chart_type,
            x: state.axes.x.clone(),
            y: state.axes.y.clone(),
            z: state.axes.z.clone(),
        }
    }

    fn is_3d(&self) -> bool {
        self.chart_type == CHART_TYPE_3D
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Payload<'a> {
    chart_type: &'a str,
    x_axis: &'a str,
    y_axis: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    z_axis: Option<&'a str>,
    data: &'a [RowRecord],
}

/// Validate the request and render the prompt text. Nothing here touches the
/// network, so every rejection is local.
pub fn build_prompt(request: &InsightRequest) -> Result<String, InsightError> {
    let dataset = request
        .dataset
        .as_deref()
        .ok_or(InsightError::MissingData)?;

    let (x, y, z) = match (request.x.as_deref(), request.y.as_deref(), request.z.as_deref()) {
        (Some(x), Some(y), Some(z)) if request.is_3d() => (x, y, Some(z)),
        _ if request.is_3d() => return Err(InsightError::MissingAxes3D),
        (Some(x), Some(y), _) => (x, y, None),
        _ => return Err(InsightError::MissingAxes),
    };

    let rows = dataset.rows();
    let payload = Payload {
        chart_type: &request.chart_type,
        x_axis: x,
        y_axis: y,
        z_axis: z,
        data: &rows[..rows.len().min(MAX_PROMPT_ROWS)],
    };
    let json = serde_json::to_string(&payload)
        .map_err(|e| InsightError::Request(format!("could not encode data: {e}")))?;

    let z_clause = z.map(|z| format!(" and {z} on the z-axis")).unwrap_or_default();
    Ok(format!(
        "Analyze this data and provide 3-5 key insights. Format the insights using markdown \
         with **bold** text for emphasis. The data represents a {} chart with {x} on the x-axis \
         and {y} on the y-axis{z_clause}: {json}",
        request.chart_type
    ))
}
