use serde_json::json;

use super::{CommandOutput, OutputOptions};
use crate::config::Config;
use crate::error::{CivicError, Result};
use crate::geocode::{LocationSearch, MapboxGeocoder, SearchOutcome};

/// Look up a place the way the report form's location box does
pub async fn cmd_geocode(text: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let token = config.map_token().ok_or_else(|| {
        CivicError::Config(
            "no map token configured; set MAPBOX_TOKEN or run: civicsync config set map.token <token>"
                .to_string(),
        )
    })?;
    let geocoder = MapboxGeocoder::new(token, config.request_timeout())?;
    let search = LocationSearch::with_settings(
        geocoder,
        config.geocode_debounce(),
        config.geocode.min_chars,
    );

    let places = match search.input(text).await? {
        SearchOutcome::Results(places) => places,
        SearchOutcome::TooShort => {
            return Err(CivicError::validation(
                "location",
                format!("type at least {} characters to search", config.geocode.min_chars),
            ));
        }
        SearchOutcome::Superseded => Vec::new(),
    };

    let text_output = if places.is_empty() {
        "No places found.".to_string()
    } else {
        places
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{:>2}. {} ({:.5}, {:.5})", i + 1, p.label, p.lat, p.lng))
            .collect::<Vec<_>>()
            .join("\n")
    };

    CommandOutput::new(json!({ "query": text, "places": places }))
        .with_text(text_output)
        .print(output)
}
