//! Course progression rules

use crate::core::types::UserLevel;

/// Level a learner moves to after finishing `level`
///
/// Advanced is terminal. Entry and unknown levels lead into Beginner.
pub fn next_level(level: Option<UserLevel>) -> UserLevel {
    match level {
        Some(UserLevel::Beginner) => UserLevel::Intermediate,
        Some(UserLevel::Intermediate) => UserLevel::Advanced,
        Some(UserLevel::Advanced) => UserLevel::Advanced,
        Some(UserLevel::Entry) | None => UserLevel::Beginner,
    }
}

/// Position in the course after an advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub level: Option<UserLevel>,
    pub video_number: u32,
    /// Set when the learner moved up to a new level
    pub promoted: bool,
}

/// Moves one video forward, promoting past the last video of a level
pub fn advance(level: Option<UserLevel>, video_number: u32, max_per_level: u32) -> Advance {
    let next = video_number.saturating_add(1);
    if next > max_per_level {
        Advance {
            level: Some(next_level(level)),
            video_number: 1,
            promoted: true,
        }
    } else {
        Advance {
            level,
            video_number: next,
            promoted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_level_table() {
        assert_eq!(next_level(Some(UserLevel::Beginner)), UserLevel::Intermediate);
        assert_eq!(next_level(Some(UserLevel::Intermediate)), UserLevel::Advanced);
        assert_eq!(next_level(Some(UserLevel::Advanced)), UserLevel::Advanced);
        assert_eq!(next_level(Some(UserLevel::Entry)), UserLevel::Beginner);
        assert_eq!(next_level(None), UserLevel::Beginner);
    }

    #[test]
    fn test_advance_within_level() {
        let step = advance(Some(UserLevel::Beginner), 1, 2);
        assert_eq!(
            step,
            Advance {
                level: Some(UserLevel::Beginner),
                video_number: 2,
                promoted: false,
            }
        );
    }

    #[test]
    fn test_advance_promotes_past_last_video() {
        let step = advance(Some(UserLevel::Beginner), 2, 2);
        assert_eq!(step.level, Some(UserLevel::Intermediate));
        assert_eq!(step.video_number, 1);
        assert!(step.promoted);

        let top = advance(Some(UserLevel::Advanced), 2, 2);
        assert_eq!(top.level, Some(UserLevel::Advanced));
        assert_eq!(top.video_number, 1);
        assert!(top.promoted);
    }
}
