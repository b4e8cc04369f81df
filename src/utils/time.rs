use std::time::Duration;

/// Time allowed for a session with `question_count` questions.
pub fn session_duration(question_count: usize) -> Duration {
    let minutes = match question_count {
        0..=5 => 20,
        6..=10 => 30,
        11..=16 => 40,
        _ => 60,
    };
    Duration::from_secs(minutes * 60)
}

/// `MM:SS`, or `HH:MM:SS` from one hour up.
pub fn format_remaining(seconds: u64) -> String {
    if seconds == 0 {
        return "00:00".to_string();
    }
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hrs > 0 {
        format!("{:02}:{:02}:{:02}", hrs, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}
