//! Activity report generation through a text-generation API.

pub mod mistral;
pub mod summary;

pub use mistral::MistralClient;
pub use summary::prepare_summary;

pub fn analysis_prompt(location: &str, summary: &str) -> String {
    format!(
        "Write a concise but technical daily weather report for {location}, based on this forecast data:

{summary}

Report guidelines:
- Give a short technical analysis of the data and point out anything unusual.
- Suggest time windows for outdoor sports such as running or cycling. Prefer mornings (7-9) and \
late afternoons (16-20) on weekdays, adapt for weekends and for bad weather, and say plainly when \
conditions are unsuitable.
- Cover temperature, wind, UV, precipitation and visibility, and the transitions through the day.
- Keep a typical day short; only go longer when conditions are special.

Format:
- Answer with HTML only, suitable for embedding in a page: paragraphs, lists and bold text where \
useful, no top-level headings such as \"Report\".
- No Markdown and no text outside the HTML.
"
    )
}

pub fn translation_prompt(html: &str) -> String {
    format!(
        "Translate the following English weather report to German.

{html}

Rules:
- Keep every HTML tag and attribute exactly as it is; translate only the text between tags.
- Leave numbers, measurements and units such as °C unchanged.
- Keep the same technical register.
- Answer with the HTML only, no explanations.
"
    )
}

// -- Tests -------------------------------------------------------------------
