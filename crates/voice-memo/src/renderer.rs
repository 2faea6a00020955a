//! Plain-text rendering of the recording screen.

use std::fmt::Write;

use voice_memo_core::ScreenState;

/// Renders a snapshot as the text shown above the prompt.
pub fn render(state: &ScreenState) -> String {
    let mut out = String::new();

    out.push_str("Press start to record your message.\n");
    if !state.message.is_empty() {
        let _ = writeln!(out, "! {}", state.message);
    }

    if state.capture.is_capturing() {
        out.push_str("[ Stop Recording ]  (recording...)\n");
    } else {
        out.push_str("[ Start Recording ]\n");
    }

    if !state.name_input.is_empty() {
        let _ = writeln!(out, "Name: {}", state.name_input);
    }

    if state.clips.is_empty() {
        out.push_str("No recordings yet.\n");
    }

    for (index, clip) in state.clips.iter().enumerate() {
        let marker = if state.editing == Some(index) {
            "  (editing)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{:>3}. {} - {}{}",
            index + 1,
            clip.name,
            clip.duration_label,
            marker
        );
    }

    out
}
