use overworld_common::Position;

/// Movement debounce: a tick does work only once the player has moved more
/// than `threshold` since the last tick that did.
#[derive(Debug, Clone)]
pub struct UpdateGate {
    threshold: f32,
    last_position: Option<Position>,
}

impl UpdateGate {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            last_position: None,
        }
    }

    /// Returns true and remembers `position` if the tick should run.
    /// The first call always opens.
    pub fn should_update(&mut self, position: Position) -> bool {
        let open = match self.last_position {
            None => true,
            Some(last) => position.distance(last) > self.threshold,
        };
        if open {
            self.last_position = Some(position);
        }
        open
    }

    /// Record `position` as handled without checking the threshold.
    pub fn force(&mut self, position: Position) {
        self.last_position = Some(position);
    }

    pub fn last_position(&self) -> Option<Position> {
        self.last_position
    }

    pub fn reset(&mut self) {
        self.last_position = None;
    }
}
