//! render_json.rs — dashboard model as pretty JSON.
//! Field order follows struct layout, so output is stable across runs.

use crate::structure::DashboardModel;
use crate::ReportError;

pub fn render_json(model: &DashboardModel) -> Result<String, ReportError> {
    serde_json::to_string_pretty(model).map_err(|e| ReportError::Serialize(e.to_string()))
}
