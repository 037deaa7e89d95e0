//! Course catalog and learner fixtures

#![allow(dead_code)]

use lernbot::core::types::{User, UserLevel, UserState, Video};

pub fn video(record_id: &str, level: &str, number: u32, title: &str, url: &str) -> Video {
    Video {
        record_id: record_id.to_string(),
        title: title.to_string(),
        description: format!("Beschreibung zu {}", title),
        question: format!("Frage zu {}?", title),
        url: url.to_string(),
        level: level.to_string(),
        number,
        benchmark: None,
    }
}

/// Welcome video plus two videos for each placement level
pub fn catalog() -> Vec<Video> {
    let mut variables = video("recB1", "Beginner", 1, "Variablen", "https://youtu.be/b1");
    variables.benchmark = Some("Eine Variable speichert einen Wert".to_string());

    vec![
        Video {
            record_id: "recE1".to_string(),
            title: "Willkommen zum Rust-Kurs".to_string(),
            description: "Schön, dass du da bist.".to_string(),
            question: "Was weißt du schon über Rust?".to_string(),
            url: String::new(),
            level: "Entry".to_string(),
            number: 1,
            benchmark: None,
        },
        variables,
        video("recB2", "Beginner", 2, "Funktionen", "https://youtu.be/b2"),
        video("recI1", "Intermediate", 1, "Traits", ""),
        video("recI2", "Intermediate", 2, "Generics", "https://youtu.be/i2"),
        video("recA1", "Advanced", 1, "Async", "https://youtu.be/a1"),
        video("recA2", "Advanced", 2, "Makros", "https://youtu.be/a2"),
    ]
}

pub fn learner(telegram_id: i64, level: UserLevel, video_number: u32, state: UserState) -> User {
    User {
        record_id: format!("recUser{}", telegram_id),
        telegram_id,
        level: Some(level),
        video_number,
        state: Some(state),
    }
}
