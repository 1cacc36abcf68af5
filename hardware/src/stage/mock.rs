use tracing::{debug, info};

use super::{Stage, StageError, StagePosition, StageResult, StageTarget, StageTravel};

/// In-memory stage for tests and dry runs.
///
/// Moves settle instantly. Every accepted target is recorded so tests can
/// assert on the exact commands a controller issued.
#[derive(Debug, Clone)]
pub struct MockStage {
    position: StagePosition,
    travel: StageTravel,
    moves: Vec<StageTarget>,
    fail_next: Option<String>,
    initialized: bool,
}

impl MockStage {
    pub fn new(position: StagePosition) -> Self {
        Self {
            position,
            travel: StageTravel::default(),
            moves: Vec::new(),
            fail_next: None,
            initialized: true,
        }
    }

    pub fn with_travel(mut self, travel: StageTravel) -> Self {
        self.travel = travel;
        self
    }

    /// A stage that rejects every command with `NotInitialized`.
    pub fn uninitialized(position: StagePosition) -> Self {
        Self {
            initialized: false,
            ..Self::new(position)
        }
    }

    /// Make the next `set_position` fail with `MotionFailed(message)`.
    pub fn fail_next_move(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    /// Targets accepted so far, oldest first.
    pub fn moves(&self) -> &[StageTarget] {
        &self.moves
    }

    pub fn current(&self) -> StagePosition {
        self.position
    }
}

impl Stage for MockStage {
    fn position(&mut self) -> StageResult<StagePosition> {
        if !self.initialized {
            return Err(StageError::NotInitialized);
        }
        Ok(self.position)
    }

    fn set_position(&mut self, target: StageTarget) -> StageResult<StagePosition> {
        if !self.initialized {
            return Err(StageError::NotInitialized);
        }
        if let Some(message) = self.fail_next.take() {
            debug!("Mock stage injected failure: {message}");
            return Err(StageError::MotionFailed(message));
        }
        self.travel.check(&target)?;

        self.position = self.position.apply(&target);
        self.moves.push(target);
        info!("Mock stage moved to {}", self.position);
        Ok(self.position)
    }

    fn travel(&self) -> StageTravel {
        self.travel
    }
}
