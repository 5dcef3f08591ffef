// ABOUTME: Prompt template rendering with single-pass placeholder substitution
// ABOUTME: Appends profile context and the fixed formatting directive, builds debug traces
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Flow Catalyst

//! Template renderer
//!
//! Replaces `{name}` and `{{name}}` placeholders with values from an input
//! map in a single left-to-right scan. Substituted text is never re-scanned,
//! so values containing placeholder-shaped text cannot inject further
//! substitutions. Placeholders with no matching input are left untouched.

use std::fmt::Write;

use serde_json::{Map, Value as JsonValue};

use crate::models::Profile;

/// Fixed directive appended to every rendered prompt
pub const FORMATTING_DIRECTIVE: &str = "\n\nFormat your response with short paragraphs. \
Use markdown headings and bullet points where they aid scanning. \
Keep the full response under roughly 500 words.";

/// A rendered prompt plus its assembly trace
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// Final prompt sent to the provider
    pub prompt: String,
    /// Developer-facing trace of how the prompt was assembled.
    ///
    /// Returned to clients as `promptDebug`; never shown in production UI
    /// paths by default.
    pub debug: String,
}

/// Render a template against an input map and optional profile
#[must_use]
pub fn render(
    template: &str,
    inputs: &Map<String, JsonValue>,
    profile: Option<&Profile>,
) -> RenderedPrompt {
    let mut prompt = substitute(template, inputs);

    if let Some(profile) = profile.filter(|p| p.has_context()) {
        prompt.push_str(&profile_context_block(profile));
    }
    prompt.push_str(FORMATTING_DIRECTIVE);

    let debug = build_debug_trace(template, inputs, profile, &prompt);

    RenderedPrompt { prompt, debug }
}

/// Single-pass placeholder substitution
///
/// Scans left to right for `{name}` and `{{name}}` tokens. A token whose name
/// appears in the input map is replaced with the value's string form
/// (non-string values are JSON-serialized); the replacement text is emitted
/// verbatim and the scan resumes after the token. Anything else is copied
/// through unchanged.
#[must_use]
pub fn substitute(template: &str, inputs: &Map<String, JsonValue>) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            // Copy the run up to the next brace in one shot.
            let next = template[i..]
                .find('{')
                .map_or(bytes.len(), |off| i + off);
            out.push_str(&template[i..next]);
            i = next;
            continue;
        }

        let double = bytes.get(i + 1) == Some(&b'{');
        let name_start = if double { i + 2 } else { i + 1 };
        let closer = if double { "}}" } else { "}" };

        match template[name_start..].find(closer) {
            Some(rel_end) => {
                let name = &template[name_start..name_start + rel_end];
                let token_end = name_start + rel_end + closer.len();
                if is_placeholder_name(name) {
                    if let Some(value) = inputs.get(name) {
                        out.push_str(&value_to_string(value));
                        i = token_end;
                        continue;
                    }
                }
                // Unknown or malformed placeholder stays byte-for-byte.
                // For "{{" we only consume one brace so the inner "{name}"
                // still gets a chance to match.
                out.push('{');
                i += 1;
            }
            None => {
                out.push('{');
                i += 1;
            }
        }
    }

    out
}

/// Placeholder names are non-empty and brace/whitespace-free
fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c == '{' || c == '}' || c.is_whitespace())
}

/// String form of an input value; non-strings are JSON-serialized
fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Profile context block appended after substitution
///
/// Only fields with content appear; each gets its own line.
fn profile_context_block(profile: &Profile) -> String {
    let mut block = String::from("\n\nContext about the person you are helping:");
    if let Some(domain) = profile.domain.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(block, "\n- Domain: {domain}");
    }
    if let Some(style) = profile.work_style.as_deref().filter(|w| !w.is_empty()) {
        let _ = write!(block, "\n- Work style: {style}");
    }
    if !profile.values.is_empty() {
        let _ = write!(block, "\n- Values: {}", profile.values.join(", "));
    }
    block
}

/// Assemble the developer-facing debug trace
fn build_debug_trace(
    template: &str,
    inputs: &Map<String, JsonValue>,
    profile: Option<&Profile>,
    final_prompt: &str,
) -> String {
    let inputs_pretty = serde_json::to_string_pretty(&JsonValue::Object(inputs.clone()))
        .unwrap_or_else(|_| "{}".to_owned());

    let mut trace = format!("=== TEMPLATE ===\n{template}\n\n=== INPUTS ===\n{inputs_pretty}");
    if let Some(profile) = profile {
        let profile_pretty =
            serde_json::to_string_pretty(profile).unwrap_or_else(|_| "{}".to_owned());
        let _ = write!(trace, "\n\n=== PROFILE ===\n{profile_pretty}");
    }
    let _ = write!(trace, "\n\n=== FINAL PROMPT ===\n{final_prompt}");
    trace
}
