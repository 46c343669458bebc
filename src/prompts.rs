use crate::models::GenerationConfig;

pub const POST_TEXT: &str = include_str!("../data/prompts/post_text.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Single pass over the template: substituted values are never rescanned, so
/// a value containing `{{...}}` is inserted verbatim. Unknown placeholders are
/// left as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after_open[..end];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => result.push_str(value),
            None => {
                result.push_str("{{");
                result.push_str(key);
                result.push_str("}}");
            }
        }
        rest = &after_open[end + 2..];
    }

    result.push_str(rest);
    result
}

/// Build the copywriting instruction for one generation config.
pub fn post_text(config: &GenerationConfig) -> String {
    render(
        POST_TEXT,
        &[
            ("length", config.length.as_str()),
            ("platform", config.platform.as_str()),
            ("topic", config.topic.trim()),
            ("tone", config.tone.as_str()),
            ("include_emoji", &config.include_emoji.to_string()),
            ("include_hashtags", &config.include_hashtags.to_string()),
        ],
    )
}
