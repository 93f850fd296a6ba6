use crate::session::models::{FileStatus, Message, Role, UploadedFile};
use chrono::{DateTime, Local, TimeZone, Utc};

/// `hh:mm AM` in the given zone.
pub fn format_time<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.with_timezone(tz).format("%I:%M %p").to_string()
}

pub fn format_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "You",
        Role::Assistant => "Pulse",
    };
    format!(
        "[{}] {}: {}",
        format_time(&message.timestamp, &Local),
        speaker,
        message.content
    )
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

pub fn format_file(file: &UploadedFile) -> String {
    let status = match file.status {
        FileStatus::Uploaded => "uploaded",
        FileStatus::Processing => "processing",
        FileStatus::Ready => "ready",
    };
    format!(
        "{} ({}, {}) id={}",
        file.name,
        format_size(file.size),
        status,
        file.upload_id.as_deref().unwrap_or("-")
    )
}
