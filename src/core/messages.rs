//! User-facing texts
//!
//! The course is taught in German, so every message the bot sends lives here.

pub const WELCOME_NOT_FOUND: &str = "Keine Willkommensnachricht gefunden.";
pub const USER_NOT_FOUND: &str = "Benutzer nicht gefunden.";
pub const START_BOT_FIRST: &str = "Bitte starte den Bot mit /start";
pub const VIDEO_NOT_FOUND: &str = "Entschuldigung, das Video konnte nicht gefunden werden.";
pub const ALREADY_REGISTERED: &str = "Du bist bereits registriert.";
pub const VIDEO_PROCESSING: &str = "Bitte warte, das Video wird gerade verarbeitet...";
pub const NEXT_VIDEO_LOADING: &str = "Nächstes Video wird geladen...";
pub const VIDEO_LOADING: &str = "Perfekt! Video wird geladen...";
pub const NEXT_VIDEO_START: &str = "Super! Dann starten wir mit dem nächsten Video!";
pub const PLACEMENT_DONE: &str = "Perfekt! Du bist bereit für dein erstes Video.";
pub const SELECTED_VIDEO_NOT_FOUND: &str = "Video nicht gefunden.";

pub const COURSE_HELP: &str = "Das ist eine gute Frage zum Kurs! Du kannst spezifische Videos auswählen, \
indem du auf die Video-Titel in der Übersicht klickst. Oder du kannst mit 'Verstanden!' zum nächsten \
Video in deinem aktuellen Level fortfahren.";

// Buttons
pub const READY_BUTTON: &str = "🚀 Ja!";
pub const UNDERSTOOD_BUTTON: &str = "Verstanden!";
pub const OVERVIEW_BUTTON: &str = "📋 Kursübersicht";

// Errors
pub const GENERAL_ERROR: &str = "Entschuldigung, es gab einen Fehler. Bitte versuche es erneut.";
pub const USER_CREATION_ERROR: &str = "Fehler beim Erstellen des Benutzers. Bitte versuche es erneut.";
pub const VIDEO_LOAD_ERROR: &str = "Fehler beim Laden des Videos.";

pub fn congratulations(level: impl std::fmt::Display) -> String {
    format!("🎉 Glückwunsch! Du bist jetzt auf dem {} Level!", level)
}

pub fn review_finished(level: impl std::fmt::Display, video_number: u32) -> String {
    format!(
        "Wiederholung beendet! Du bist zurück bei {} Video {}.",
        level, video_number
    )
}

pub fn video_selected(title: &str, review: bool) -> String {
    let suffix = if review { " (Wiederholung)" } else { "" };
    format!("Video wird geladen: {}{}", title, suffix)
}

pub fn feedback(text: &str) -> String {
    format!("💭 {}", text)
}

pub fn thanks_for_answer(text: &str) -> String {
    format!("Danke für deine Antwort: {}", text)
}

pub fn you_said(text: &str) -> String {
    format!("Du hast gesagt: {}", text)
}

pub fn video_intro(title: &str, description: &str) -> String {
    format!("📹 {}. \n {}", title, description)
}

pub fn video_title(title: &str) -> String {
    format!("📹 {}", title)
}

pub fn video_link(url: &str) -> String {
    format!("🎥 Video: {}", url)
}

pub fn video_question(question: &str) -> String {
    format!("❓ {}", question)
}
