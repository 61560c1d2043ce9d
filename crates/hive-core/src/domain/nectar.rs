//! Nectar award rules.
//!
//! An admin may award nectar to a post's author once per post, only after the
//! post has been approved, and a given author can receive at most one award
//! per 24-hour window.

use chrono::{DateTime, Duration, Utc};

use crate::domain::Post;
use crate::error::DomainError;

/// Fixed amount credited per award.
pub const AWARD_AMOUNT: i32 = 5;

/// Minimum spacing between two awards to the same user.
pub fn cooldown() -> Duration {
    Duration::hours(24)
}

/// Check that the post itself is in an awardable state.
pub fn check_post_awardable(post: &Post) -> Result<(), DomainError> {
    if !post.approved {
        return Err(DomainError::InvalidState(
            "Post must be approved before awarding nectar".to_string(),
        ));
    }
    if post.nectar_awarded {
        return Err(DomainError::InvalidState(
            "Nectar already awarded for this post".to_string(),
        ));
    }
    Ok(())
}

/// Remaining wait in whole hours (rounded up) before the user may receive
/// nectar again, or `None` when the cooldown has elapsed.
pub fn cooldown_remaining_hours(
    last_award_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let last = last_award_at?;
    let remaining = last + cooldown() - now;
    if remaining <= Duration::zero() {
        return None;
    }
    // Ceiling division on seconds.
    Some((remaining.num_seconds() + 3599) / 3600)
}
