//! Local deterministic story renderer.
//!
//! Used whenever the remote model is unavailable. Rendering is pure: one
//! template per section is chosen at random, the normalized prompt is
//! interpolated into each, and the sections are joined under a fixed banner.
//! No I/O, bounded latency.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Banner printed above every fallback story.
const TITLE_BANNER: &str = "THE SATIRE PRESS | WIRE DESK";

/// `{}` marks where the normalized prompt is spliced in. A template may use
/// the marker more than once.
const HEADLINES: &[&str] = &[
    "REPORT: {} More Widespread Than Previously Believed",
    "Nation Stunned As {} Proceeds Exactly As Planned",
    "Experts Warn {} May Be Contagious",
    "Area Man Unsure How To Feel About {}",
    "Sources Confirm {} Was Inevitable All Along",
];

const INTROS: &[&str] = &[
    "In what analysts are calling an unprecedented development, {} has dominated the national conversation since early this morning.",
    "Residents awoke today to the news that {} is no longer a hypothetical.",
    "A study released Tuesday confirms what many had long suspected: {}.",
    "Witnesses report that {} began quietly, then refused to stay quiet.",
];

const QUOTES: &[&str] = &[
    "\"I never thought I'd see the day,\" said local resident Janet Mercer, struggling to find words. \"But here we are, and {} is just our life now.\"",
    "\"Frankly, we should have seen {} coming,\" admitted Dr. Paul Reiner of the Institute for Applied Hindsight.",
    "\"My first thought was for the children,\" said one onlooker. \"My second thought was that {} would make a tremendous screensaver.\"",
    "\"We are monitoring the situation closely,\" a spokesperson said, declining to explain what {} means for the average household.",
];

const DEVELOPMENTS: &[&str] = &[
    "Officials declined to comment directly, though anonymous sources within the administration suggested that {} is \"just the beginning.\" Markets reacted predictably, with analysts forecasting either doom or celebration, depending on who was asked.",
    "By mid-afternoon a task force had been assembled, a hotline established, and a commemorative mug commissioned, all without anyone agreeing on what {} actually entails.",
    "City council members spent three hours debating whether {} falls under zoning, public health, or acts of God, before tabling the motion in the hope that {} resolves itself.",
    "A fundraising page related to {} raised fourteen dollars in its first hour, most of it from a retired schoolteacher who admitted she \"just liked the picture.\"",
];

const CONCLUSIONS: &[&str] = &[
    "At press time, {} showed no signs of slowing down.",
    "As of this writing, officials maintain that {} is under control, which historians note is also what they said last time.",
    "The public is advised to remain calm, stay indoors, and accept that {} is the new normal.",
    "A follow-up report on {} is expected as soon as anyone can be found willing to write it.",
];

/// Render a fallback story using thread-local randomness.
pub fn render(prompt: &str) -> String {
    render_with(prompt, &mut rand::thread_rng())
}

/// Render a fallback story with a fixed seed. Same seed and prompt, same
/// story.
pub fn render_seeded(prompt: &str, seed: u64) -> String {
    render_with(prompt, &mut StdRng::seed_from_u64(seed))
}

/// Render a fallback story, drawing template choices from `rng`.
pub fn render_with<R: Rng + ?Sized>(prompt: &str, rng: &mut R) -> String {
    let subject = normalize_prompt(prompt);

    let sections = [
        interpolate(pick(rng, HEADLINES), &subject),
        interpolate(pick(rng, INTROS), &subject),
        interpolate(pick(rng, QUOTES), &subject),
        interpolate(pick(rng, DEVELOPMENTS), &subject),
        interpolate(pick(rng, CONCLUSIONS), &subject),
    ];

    format!("{TITLE_BANNER}\n\n{}", sections.join("\n\n"))
}

/// Normalize a prompt so it embeds grammatically mid-sentence: trim
/// whitespace, drop trailing sentence punctuation, and lowercase each word's
/// leading capital. Acronyms keep their caps.
pub fn normalize_prompt(prompt: &str) -> String {
    let stripped = prompt.trim().trim_end_matches(['.', '!', '?', '…']).trim_end();

    stripped
        .split_whitespace()
        .map(decapitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn decapitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest = chars.as_str();
            if rest.chars().any(|c| c.is_uppercase()) {
                // "NASA", "McRib": not a plain capitalized word, leave it.
                word.to_string()
            } else {
                first.to_lowercase().chain(rest.chars()).collect()
            }
        }
        _ => word.to_string(),
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, options: &'a [&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

fn interpolate(template: &str, subject: &str) -> String {
    template.replace("{}", subject)
}
