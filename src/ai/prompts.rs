//! Prompt templates for clothing recommendations

use crate::models::CurrentConditions;
use crate::settings::Locale;

const INSTRUCTIONS: &str = "You are the clothing assistant of a weather application. \
Recommend what the user should wear today based on the current conditions below. \
The conditions arrive as a single line: 'Time: <time>, Apparent Temperature: <value> celsius, \
Relative Humidity: <value>%, Rain: <value> mm, Showers: <value> mm, Snowfall: <value> mm, \
Wind Speed: <value> ms, Wind Gusts: <value> ms'. \
Take temperature, humidity, precipitation and wind into account. \
Answer in plain unformatted text of at most 150 words, covering layers, accessories and footwear.";

const EN_LANGUAGE: &str = "Write the answer in English. A good answer reads like: \
\"It feels like about 6 degrees with 60% humidity and no rain expected. \
A light jacket or windbreaker over a long-sleeved sweater will keep you comfortable. \
Closed shoes or sneakers are a good choice.\"";

const UA_LANGUAGE: &str = "Write the answer in Ukrainian. A good answer reads like: \
\"Відчувається як близько 6 градусів, вологість 60%, опадів не очікується. \
Легка куртка або вітровка поверх светра з довгим рукавом буде доречною. \
Зі взуття підійдуть кросівки або закриті черевики.\"";

/// Full prompt: instructions, language section, then the weather line
#[must_use]
pub fn clothing_prompt(locale: Locale, conditions: &CurrentConditions) -> String {
    let language = match locale {
        Locale::En => EN_LANGUAGE,
        Locale::Ua => UA_LANGUAGE,
    };
    format!(
        "{INSTRUCTIONS}\n\n{language}\n\nWeather Data:\n{}",
        conditions.prompt_line()
    )
}
