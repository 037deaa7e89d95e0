//! Course overview: progress text and video selection buttons

use super::reply::CallbackAction;
use crate::core::types::{UserLevel, Video};

const HEADER: &str = "📋 **Kursübersicht**";
const TITLE_LIMIT: usize = 30;
const UNKNOWN_LEVEL: &str = "Unknown";

const DONE: &str = "✅";
const CURRENT: &str = "📍";
const UPCOMING: &str = "⏳";

/// A selectable video in the overview keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewButton {
    pub text: String,
    pub callback: CallbackAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOverview {
    /// Markdown text
    pub text: String,
    /// One button per row, only for finished and current videos
    pub buttons: Vec<OverviewButton>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Status {
    Done,
    Current,
    Upcoming,
}

impl Status {
    fn icon(self) -> &'static str {
        match self {
            Status::Done => DONE,
            Status::Current => CURRENT,
            Status::Upcoming => UPCOMING,
        }
    }
}

/// Groups the catalog by level in course order; unknown levels follow in first-seen order
fn group_by_level(videos: &[Video]) -> Vec<(&str, Vec<&Video>)> {
    let mut groups: Vec<(&str, Vec<&Video>)> = Vec::new();
    for video in videos {
        let level = if video.level.trim().is_empty() {
            UNKNOWN_LEVEL
        } else {
            video.level.as_str()
        };
        match groups.iter_mut().find(|(name, _)| *name == level) {
            Some((_, members)) => members.push(video),
            None => groups.push((level, vec![video])),
        }
    }

    let rank = |name: &str| {
        UserLevel::ALL
            .iter()
            .position(|level| level.as_str() == name)
            .unwrap_or(UserLevel::ALL.len())
    };
    // stable: unknown levels keep their first-seen order
    groups.sort_by_key(|(name, _)| rank(name));
    for (_, members) in &mut groups {
        members.sort_by_key(|video| video.number);
    }
    groups
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_LIMIT {
        let head: String = title.chars().take(TITLE_LIMIT).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

/// Renders the overview for a learner at `video_number` of `level`
///
/// Levels before the learner's level count as finished, levels after it as upcoming.
pub fn build_overview(videos: &[Video], level: Option<UserLevel>, video_number: u32) -> CourseOverview {
    if videos.is_empty() {
        return CourseOverview {
            text: format!("{}\n\nKeine Videos gefunden.", HEADER),
            buttons: Vec::new(),
        };
    }

    let current_level = level.map(|l| l.as_str()).unwrap_or_default();
    let mut lines = vec![format!("{}\n", HEADER)];
    let mut buttons = Vec::new();
    let mut completed = 0usize;
    let mut current_level_reached = false;

    for (name, members) in group_by_level(videos) {
        let is_current_level = name == current_level;
        if is_current_level {
            lines.push(format!("📍 **{} Level** (Aktuell)", name));
        } else {
            lines.push(format!("📚 **{} Level**", name));
        }

        for video in members {
            let status = if is_current_level {
                match video.number.cmp(&video_number) {
                    std::cmp::Ordering::Less => Status::Done,
                    std::cmp::Ordering::Equal => Status::Current,
                    std::cmp::Ordering::Greater => Status::Upcoming,
                }
            } else if !current_level_reached {
                Status::Done
            } else {
                Status::Upcoming
            };

            if status == Status::Done {
                completed += 1;
            }
            lines.push(format!(
                "  {} Video {}: 📹 {}",
                status.icon(),
                video.number,
                video.title
            ));

            if status != Status::Upcoming {
                buttons.push(OverviewButton {
                    text: format!(
                        "{} {} Video {}: {}",
                        status.icon(),
                        name,
                        video.number,
                        truncate_title(&video.title)
                    ),
                    callback: CallbackAction::SelectVideo {
                        video_id: video.record_id.clone(),
                        review: status == Status::Done,
                    },
                });
            }
        }

        if is_current_level {
            current_level_reached = true;
        }
        lines.push(String::new());
    }

    let total = videos.len();
    let percentage = completed as f64 / total as f64 * 100.0;
    lines.push(format!(
        "📊 **Gesamtfortschritt**: {}/{} Videos ({:.0}%)",
        completed, total, percentage
    ));

    tracing::debug!(
        event = "course_overview_generated",
        level = current_level,
        video_number,
        total,
        completed,
        "course overview generated"
    );

    CourseOverview {
        text: lines.join("\n"),
        buttons,
    }
}
