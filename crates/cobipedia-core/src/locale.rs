/// English display name of a locale code, used in translator prompts and
/// log banners. Unknown codes are returned unchanged.
#[must_use]
pub fn language_name(locale: &str) -> &str {
    match locale {
        "de" => "German",
        "en" => "English",
        "pl" => "Polish",
        "cs" => "Czech",
        "fr" => "French",
        "nl" => "Dutch",
        _ => locale,
    }
}
