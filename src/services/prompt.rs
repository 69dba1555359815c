use crate::models::MediaType;

/// Number of items requested per batch
pub const PAGE_SIZE: usize = 12;

/// Platform names the model is steered towards so card icons can be matched
pub const REFERENCE_PLATFORMS: [&str; 11] = [
    "Netflix",
    "Hulu",
    "Max",
    "Disney+",
    "Amazon Prime Video",
    "Apple TV+",
    "Peacock",
    "Paramount+",
    "Crunchyroll",
    "Showtime",
    "Starz",
];

const EXAMPLE_RESPONSE: &str = r#"{
  "recommendations": [
    {
      "title": "Example Movie",
      "year": 2023,
      "summary": "An example summary.",
      "rating": 8.5,
      "streamingPlatforms": ["Netflix", "Hulu"]
    }
  ]
}"#;

/// Builds the instruction asking for one page of `media_type` matching `query`
///
/// Titles in `exclude_titles` are listed verbatim so the model can skip
/// items already shown.
pub fn build_prompt(query: &str, media_type: MediaType, exclude_titles: &[String]) -> String {
    let mut prompt = format!(
        "Find {PAGE_SIZE} relevant {} for the query: \"{query}\".\n",
        media_type.prompt_label()
    );

    if !exclude_titles.is_empty() {
        prompt.push_str(&format!(
            "Do NOT include any of the following titles: {}.\n",
            exclude_titles.join(", ")
        ));
    }

    prompt.push_str(&format!(
        "For each item, provide title, year, summary, rating, and streamingPlatforms. \
         Use common platform names like {}.\n",
        REFERENCE_PLATFORMS.join(", ")
    ));
    prompt.push_str(
        "IMPORTANT: Your response MUST be a single JSON object with one key: \"recommendations\", \
         which is an array of the found items.\n",
    );
    prompt.push_str(
        "DO NOT include any other text, notes, or markdown formatting like ```json.\n\n",
    );
    prompt.push_str("Example response format:\n");
    prompt.push_str(EXAMPLE_RESPONSE);
    prompt.push('\n');

    prompt
}
