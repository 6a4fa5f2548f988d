use crate::cycle::CycleState;
use thiserror::Error;
use tracing::info;

/// Render error types
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to serialize cycle state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Consumer of per-cycle state
pub trait Renderer {
    fn render(&mut self, state: &CycleState) -> Result<(), RenderError>;
}

/// Logs every Nth cycle as one JSON object, histories omitted
pub struct LogRenderer {
    every: u32,
    count: u32,
}

impl LogRenderer {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            count: 0,
        }
    }

    /// JSON line for a state, without the sample histories
    pub fn summary(state: &CycleState) -> Result<String, RenderError> {
        let mut value = serde_json::to_value(state)?;
        if let Some(map) = value.as_object_mut() {
            map.remove("hr_history");
            map.remove("br_history");
        }
        Ok(value.to_string())
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, state: &CycleState) -> Result<(), RenderError> {
        self.count = self.count.wrapping_add(1);
        if self.count % self.every != 0 && state.alert.is_none() {
            return Ok(());
        }
        info!(target: "dashboard::state", "{}", Self::summary(state)?);
        Ok(())
    }
}
