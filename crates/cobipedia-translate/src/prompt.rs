//! Prompt construction for a single entry translation.

use cobipedia_core::{language_name, ContentTypeProfile, SourceEntry};

/// System and user text for one Messages API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// Fields the model is asked to return, in profile order.
    pub expected_fields: Vec<&'static str>,
}

fn system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "You translate catalog content about military history and building block sets \
         (similar to LEGO) from {source_language} into {target_language}. \
         Reply with a single JSON object and nothing else: no markdown, no commentary."
    )
}

/// Builds the prompt for translating `entry` from `source_locale` into
/// `target_locale`.
///
/// Only translatable fields with a non-empty source value are listed, both in
/// the input block and in the expected JSON shape.
#[must_use]
pub fn build_prompt(
    profile: &ContentTypeProfile,
    entry: &SourceEntry,
    source_locale: &str,
    target_locale: &str,
) -> Prompt {
    let source_language = language_name(source_locale);
    let target_language = language_name(target_locale);
    let values = entry.translatable_values(profile);

    let shape = values
        .iter()
        .map(|(field, _)| format!("\"{field}\": \"...\""))
        .collect::<Vec<_>>()
        .join(", ");
    let input = values
        .iter()
        .map(|(field, value)| format!("{field}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "Translate the following {context} from {source_language} into {target_language}.\n\
         \n\
         Guidelines:\n\
         - Leave proper nouns as they are: names of ships, vehicles, aircraft and people.\n\
         - Copy military and technical designations exactly (for example \"Sd.Kfz. 234\", \"M4A3E8\", \"Bf 109 F-2\").\n\
         - Translate generic terms (Panzer becomes Tank, Schiff becomes Ship, Flugzeug becomes Aircraft).\n\
         - Keep set numbers and technical specifications unchanged.\n\
         - Stay concise and factual and keep the tone of the original.\n\
         - Leave out any field that is empty or missing.\n\
         \n\
         Answer with JSON shaped like {{{shape}}}\n\
         \n\
         Source:\n\
         {input}",
        context = profile.prompt_context,
    );

    Prompt {
        system: system_prompt(source_language, target_language),
        user,
        expected_fields: values.iter().map(|(field, _)| *field).collect(),
    }
}
