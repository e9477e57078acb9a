//! Output formatting for headless mode.

use super::{HeadlessResult, HeadlessState};
use crate::cli::OutputFormat;
use serde::Serialize;

/// JSON output structure.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    screen: &'a str,
    screen_lines: &'a [String],
    cursor: CursorPosition,
    events_executed: usize,
    pending_keys: usize,
    bells: usize,
    duration_ms: u64,
    state: &'a HeadlessState,
}

#[derive(Debug, Serialize)]
struct CursorPosition {
    column: u16,
    row: u16,
}

/// Formats headless execution results.
pub struct HeadlessOutput {
    format: OutputFormat,
}

impl HeadlessOutput {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result according to the configured format.
    pub fn format(&self, result: &HeadlessResult) -> String {
        match self.format {
            OutputFormat::Text => self.format_text(result),
            OutputFormat::Json => self.format_json(result),
        }
    }

    fn format_text(&self, result: &HeadlessResult) -> String {
        let pending = if result.pending_keys > 0 {
            format!(" | {} keys unread", result.pending_keys)
        } else {
            String::new()
        };

        format!(
            "{}\nEvents: {} executed in {}ms{}\n",
            result.screen,
            result.events_executed,
            result.duration.as_millis(),
            pending
        )
    }

    fn format_json(&self, result: &HeadlessResult) -> String {
        let json_output = JsonOutput {
            screen: &result.screen,
            screen_lines: &result.screen_lines,
            cursor: CursorPosition {
                column: result.cursor.0,
                row: result.cursor.1,
            },
            events_executed: result.events_executed,
            pending_keys: result.pending_keys,
            bells: result.bells,
            duration_ms: result.duration.as_millis() as u64,
            state: &result.state,
        };

        serde_json::to_string_pretty(&json_output)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn make_test_result() -> HeadlessResult {
        HeadlessResult {
            screen: "> show version\nishell 0.1.0\n".to_string(),
            screen_lines: vec!["> show version".to_string(), "ishell 0.1.0".to_string()],
            cursor: (2, 2),
            events_executed: 2,
            pending_keys: 0,
            bells: 0,
            duration: Duration::from_millis(15),
            state: HeadlessState {
                prompt: "> ".to_string(),
                tag: None,
                history_pool: "default".to_string(),
                history: vec!["show version".to_string()],
                stopped: false,
            },
        }
    }

    #[test]
    fn test_text_output() {
        let output = HeadlessOutput::new(OutputFormat::Text).format(&make_test_result());
        assert!(output.starts_with("> show version\nishell 0.1.0\n"));
        assert!(output.contains("Events: 2 executed in 15ms"));
        assert!(!output.contains("unread"));
    }

    #[test]
    fn test_text_output_reports_unread_keys() {
        let mut result = make_test_result();
        result.pending_keys = 3;
        let output = HeadlessOutput::new(OutputFormat::Text).format(&result);
        assert!(output.contains("| 3 keys unread"));
    }

    #[test]
    fn test_json_output() {
        let output = HeadlessOutput::new(OutputFormat::Json).format(&make_test_result());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["events_executed"], 2);
        assert_eq!(parsed["cursor"]["row"], 2);
        assert_eq!(parsed["screen_lines"][1], "ishell 0.1.0");
        assert_eq!(parsed["state"]["history"][0], "show version");
        assert_eq!(parsed["state"]["history_pool"], "default");
        assert!(parsed["state"]["tag"].is_null());
    }
}
