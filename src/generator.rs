//! Plan Generator — renders the generation prompt and invokes the model.
//!
//! The prompt is a deterministic function of the validated profile: every
//! field value appears verbatim, and absent optional fields render as the
//! literal `None`. The generated plan is opaque text; the only check on it
//! is non-emptiness.

use std::sync::Arc;

use tracing::info;

use crate::error::GenerationError;
use crate::llm::{ChatMessage, CompletionRequest, PlanModel};
use crate::profile::Profile;

/// Output-length budget for the plan completion (model token accounting).
const PLAN_MAX_TOKENS: u32 = 1500;

/// System role framing for the model.
const SYSTEM_PROMPT: &str = "You are a professional fitness coach and nutritionist.";

/// A generated plan — opaque plain text, guaranteed non-empty.
#[derive(Debug, Clone)]
pub struct GeneratedPlan(String);

impl GeneratedPlan {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plan Generator — stage 2 of the pipeline.
pub struct PlanGenerator {
    model: Arc<dyn PlanModel>,
}

impl PlanGenerator {
    pub fn new(model: Arc<dyn PlanModel>) -> Self {
        Self { model }
    }

    /// Generate a plan for a validated profile.
    ///
    /// One model call, no retry. An empty or whitespace-only completion is a
    /// generation failure, not a valid plan.
    pub async fn generate(&self, profile: &Profile) -> Result<GeneratedPlan, GenerationError> {
        let prompt = render_prompt(profile);

        let request = CompletionRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_max_tokens(PLAN_MAX_TOKENS);

        let response = self.model.complete(request).await?;

        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyPlan);
        }

        info!(
            model = self.model.model_name(),
            recipient = %profile.email,
            "Generated fitness plan"
        );
        Ok(GeneratedPlan(response.content))
    }
}

/// Render the generation prompt from a validated profile.
fn render_prompt(profile: &Profile) -> String {
    let equipment = profile.equipment.as_deref().unwrap_or("None");
    let additional_info = profile.additional_info.as_deref().unwrap_or("None");

    format!(
        "Create a highly detailed 7-day fitness and diet plan for a user based on the following details:\n\
         \n\
         - **Email:** {email}\n\
         - **Fitness Goal:** {fitness_goal}\n\
         - **Where do you train:** {training_location}\n\
         - **Available Equipment (if any):** {equipment}\n\
         - **Current Weight:** {weight} kg\n\
         - **Fitness Level:** {fitness_level}\n\
         - **Diet Level:** {diet_level}\n\
         - **Height:** {height} cm\n\
         - **Age:** {age}\n\
         - **Average Hours of Sleep:** {sleep_hours} hours\n\
         - **How many times do you train per week:** {training_frequency}\n\
         - **Additional Information:** {additional_info}\n\
         \n\
         - **Fitness Plan Format:**\n\
         1. Daily workout plan (including exercise names, sets, reps, and rest time)\n\
         2. Daily diet plan (meals with calorie & macronutrient breakdown)\n\
         3. Any special tips or adjustments based on fitness level, equipment, and diet level.\n",
        email = profile.email,
        fitness_goal = profile.fitness_goal,
        training_location = profile.training_location,
        equipment = equipment,
        weight = profile.weight,
        fitness_level = profile.fitness_level,
        diet_level = profile.diet_level,
        height = profile.height,
        age = profile.age,
        sleep_hours = profile.sleep_hours,
        training_frequency = profile.training_frequency,
        additional_info = additional_info,
    )
}
