//! Prompt synthesis for the music and narration providers.
//!
//! Both builders are pure and deterministic. Excerpts are cut on character
//! boundaries, never mid-codepoint.

use crate::domain::JobRequest;

/// Return at most `max_chars` characters of `text`.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Prompt sent to the music composition endpoint.
#[must_use]
pub fn music_prompt(request: &JobRequest, story_excerpt_chars: usize) -> String {
    format!(
        "A heartfelt {style} song for {occasion}. This is for {recipients}, who is my \
         {relationship}. {story}... The song should capture the love and connection we share.",
        style = request.music_style,
        occasion = request.occasion,
        recipients = request.recipient_names,
        relationship = request.relationship,
        story = excerpt(&request.story, story_excerpt_chars),
    )
}

/// Script read by the text-to-speech fallback.
#[must_use]
pub fn narration_prompt(request: &JobRequest, music_prompt: &str, excerpt_chars: usize) -> String {
    let style = request.music_style;
    format!(
        "[Music] A beautiful {style} melody plays softly in the background. \
         [Narrator] This is a song for {recipients}, my {relationship}. \
         {body}... The music swells with emotion, capturing the love and connection we share. \
         [Music continues] The {style} rhythm flows, telling our story through melody and harmony.",
        recipients = request.recipient_names,
        relationship = request.relationship,
        body = excerpt(music_prompt, excerpt_chars),
    )
}
