use rakecore::Reading;
use serde::{Deserialize, Serialize};

/// Latest state consumed by ring renderers: the most recent reading plus
/// enough rolling history to scale the rings, and the session counters.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LiveModel {
    pub latest: Option<Reading>,
    pub temperature_history: Vec<f32>,
    pub humidity_history: Vec<f32>,
    pub pressure_history: Vec<f32>,
    pub rows_logged: u64,
    pub read_failures: u64,
}

impl LiveModel {
    /// Replaces the latest reading and extends the rolling history, keeping
    /// at most `history_len` points per field. Unknown fields leave their
    /// history untouched so the rings hold their last shape.
    pub fn absorb(&mut self, reading: &Reading, history_len: usize) {
        push_capped(&mut self.temperature_history, reading.temperature, history_len);
        push_capped(&mut self.humidity_history, reading.humidity, history_len);
        push_capped(&mut self.pressure_history, reading.pressure, history_len);
        self.latest = Some(reading.clone());
    }
}

fn push_capped(history: &mut Vec<f32>, value: Option<f32>, cap: usize) {
    if let Some(value) = value {
        history.push(value);
        if history.len() > cap {
            let overflow = history.len() - cap;
            history.drain(..overflow);
        }
    }
}
