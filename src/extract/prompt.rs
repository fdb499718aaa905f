//! Model instruction construction

use crate::constants::extract::SNIPPET_SEPARATOR;
use crate::geo::AreaBounds;

/// Build the extraction instruction for a batch of snippets
pub fn build_prompt(snippets: &[String], location: &str, bounds: &AreaBounds) -> String {
    let content = snippets.join(SNIPPET_SEPARATOR);

    format!(
        r#"You are extracting training centers from web content about {location}.

Area bounds: north {north}, south {south}, east {east}, west {west}.

Only return facilities that are literally named in the content below. Do not invent, guess or add facilities from your own knowledge. If a facility has no coordinates in the content, estimate a plausible position inside the area bounds.

Return ONLY a JSON array, with no other text, where each element has these fields:
{{"name": string, "address": string, "description": string, "phone": string, "website": string, "email": string, "lat": number, "lng": number, "source": string}}
Use an empty string for unknown text fields. If the content mentions no real training centers, return [].

Content:
{content}"#,
        location = location,
        north = bounds.north,
        south = bounds.south,
        east = bounds.east,
        west = bounds.west,
        content = content,
    )
}
