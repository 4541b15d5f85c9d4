// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt construction for the external generator.

use std::fmt::Write;

use tidewell_core::MoodSample;

const ROLE_LINE: &str = "You are a workplace well-being expert. Analyze the following mood data and provide 2-3 actionable recommendations.";
const ENTRIES_HEADER: &str = "Recent mood entries (scale 1-5):";
const FORMAT_INSTRUCTIONS: &str = "Provide recommendations in this format:
1. [TYPE]: [Short actionable recommendation]
Types: BREATHING, STRETCH, FOCUS, MUSIC, HYDRATION, BREAK, CUSTOM
Keep each recommendation under 100 characters.";

/// Renders the analysis prompt for a window of samples, one line per sample.
pub fn build_prompt(samples: &[MoodSample]) -> String {
    let mut prompt = String::with_capacity(256 + samples.len() * 64);
    prompt.push_str(ROLE_LINE);
    prompt.push_str("\n\n");
    prompt.push_str(ENTRIES_HEADER);
    prompt.push('\n');

    for sample in samples {
        // Writing into a String cannot fail.
        let _ = write!(
            prompt,
            "- Date: {}, Mood: {}, Stress: {}, Productivity: {}",
            sample.date, sample.mood, sample.stress, sample.productivity
        );
        if let Some(notes) = sample.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            prompt.push_str(", Notes: ");
            prompt.push_str(notes);
        }
        prompt.push('\n');
    }

    prompt.push('\n');
    prompt.push_str(FORMAT_INSTRUCTIONS);
    prompt
}
