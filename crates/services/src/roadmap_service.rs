use std::sync::Arc;

use career_core::model::{CareerTitle, CompletedStep, StepIndex, UserId};
use storage::repository::StepRepository;

use crate::Clock;
use crate::error::RoadmapServiceError;

/// Progress through a career roadmap, tracked per step.
#[derive(Clone)]
pub struct RoadmapService {
    clock: Clock,
    steps: Arc<dyn StepRepository>,
}

fn parse_step(
    career_title: &str,
    step_index: Option<i64>,
) -> Result<(CareerTitle, StepIndex), RoadmapServiceError> {
    let Some(step_index) = step_index else {
        return Err(RoadmapServiceError::MissingFields);
    };
    if career_title.trim().is_empty() {
        return Err(RoadmapServiceError::MissingFields);
    }
    Ok((
        CareerTitle::new(career_title)?,
        StepIndex::from_i64(step_index)?,
    ))
}

impl RoadmapService {
    #[must_use]
    pub fn new(clock: Clock, steps: Arc<dyn StepRepository>) -> Self {
        Self { clock, steps }
    }

    /// Mark a step complete. Completing it again refreshes the timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RoadmapServiceError::MissingFields` or
    /// `RoadmapServiceError::Step` for bad input, and
    /// `RoadmapServiceError::Storage` if persistence fails.
    pub async fn complete(
        &self,
        user_id: UserId,
        career_title: &str,
        step_index: Option<i64>,
    ) -> Result<(), RoadmapServiceError> {
        let (career_title, step_index) = parse_step(career_title, step_index)?;
        self.steps
            .mark_completed(&CompletedStep {
                user_id,
                career_title,
                step_index,
                completed_at: self.clock.now(),
            })
            .await?;
        Ok(())
    }

    /// Undo a completion. Undoing a step that was never completed succeeds.
    ///
    /// # Errors
    ///
    /// Same as [`RoadmapService::complete`].
    pub async fn uncomplete(
        &self,
        user_id: UserId,
        career_title: &str,
        step_index: Option<i64>,
    ) -> Result<(), RoadmapServiceError> {
        let (career_title, step_index) = parse_step(career_title, step_index)?;
        self.steps
            .unmark_completed(user_id, &career_title, step_index)
            .await?;
        Ok(())
    }

    /// Completed step indexes for a career, ascending.
    ///
    /// # Errors
    ///
    /// Returns `RoadmapServiceError::Step` for an invalid title and
    /// `RoadmapServiceError::Storage` if the query fails.
    pub async fn completed_steps(
        &self,
        user_id: UserId,
        career_title: &str,
    ) -> Result<Vec<u32>, RoadmapServiceError> {
        let career_title = CareerTitle::new(career_title)?;
        let steps = self.steps.completed_steps(user_id, &career_title).await?;
        Ok(steps.into_iter().map(|s| s.value()).collect())
    }
}
