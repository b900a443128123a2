//! Heart-reaction toggle.
//!
//! Each call flips the caller's single "heart" on a public dream: present →
//! removed, absent → added. The store's `UNIQUE(dream_id, user_id, kind)`
//! constraint is the only concurrency control — a concurrent duplicate add
//! surfaces as an ignored insert, never as an error.

use crate::error::ApiError;
use crate::storage::Storage;

/// The only reaction kind currently defined.
pub const HEART: &str = "heart";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Added,
    Removed,
}

impl ToggleAction {
    pub fn message(self) -> &'static str {
        match self {
            ToggleAction::Added => "Reaction added",
            ToggleAction::Removed => "Reaction removed",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    /// Total heart count on the dream after the toggle.
    pub heart_count: u64,
}

/// Toggle the caller's heart on `dream_id`.
///
/// Fails `NotFound` when the dream does not exist and `Forbidden` when it is
/// private — private dreams cannot be reacted to, including by their owner.
pub async fn toggle_heart(
    storage: &Storage,
    user_id: &str,
    dream_id: &str,
) -> Result<ToggleOutcome, ApiError> {
    let dream = storage
        .get_dream(dream_id)
        .await?
        .ok_or(ApiError::NotFound("Dream not found"))?;

    if !dream.is_public {
        return Err(ApiError::Forbidden("Cannot react to a private dream"));
    }

    let action = if storage.delete_reaction(dream_id, user_id, HEART).await? {
        ToggleAction::Removed
    } else {
        // An ignored insert means a concurrent call already added the row;
        // the reaction exists either way, so the outcome is still "added".
        storage
            .insert_reaction_or_ignore(dream_id, user_id, HEART)
            .await?;
        ToggleAction::Added
    };

    let heart_count = storage.count_reactions(dream_id, HEART).await?;
    Ok(ToggleOutcome {
        action,
        heart_count,
    })
}
