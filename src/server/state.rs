use crate::gate::GenerationGate;

#[derive(Clone)]
pub struct AppState {
    pub gate: GenerationGate,
}

impl AppState {
    pub fn new(gate: GenerationGate) -> Self {
        Self { gate }
    }
}
