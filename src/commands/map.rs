use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions};
use crate::backend::IssueBackend;
use crate::controller::BrowseController;
use crate::display::marker_table;
use crate::error::{CivicError, Result};
use crate::map::{MapView, Viewport};
use crate::types::{Coordinates, IssueCategory, IssueStatus};

/// Map filters from the command line. Empty sets keep the map defaults.
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub categories: Vec<IssueCategory>,
    pub statuses: Vec<IssueStatus>,
    pub search: Option<String>,
    pub select: Option<String>,
    pub fallback: Coordinates,
    pub page_size: usize,
}

/// Print the markers the map would draw and where its camera ends up
pub async fn cmd_map<B: IssueBackend>(
    backend: &B,
    options: MapOptions,
    output: OutputOptions,
) -> Result<()> {
    let map = MapView::new(Viewport::default(), options.fallback);
    let mut controller = BrowseController::new(options.page_size, map);
    controller.refresh(backend).await?;

    if !options.categories.is_empty() {
        for category in IssueCategory::ALL {
            controller.map_toggle_category(category, options.categories.contains(&category));
        }
    }
    if !options.statuses.is_empty() {
        for status in IssueStatus::ALL {
            controller.map_toggle_status(status, options.statuses.contains(&status));
        }
    }
    if let Some(search) = &options.search {
        controller.map_set_search(search);
    }

    let reframed = controller.map_reframe();
    if let Some(id) = &options.select
        && !controller.map_select(id)
    {
        return Err(CivicError::NotFound(id.clone()));
    }

    let markers = controller.map_markers();
    let camera = controller.map().camera();

    let mut text = if markers.is_empty() {
        "No issues match the map filters.".to_string()
    } else {
        marker_table(&markers)
    };
    text.push_str(&format!(
        "\n{}",
        format!(
            "Camera: {:.4}, {:.4} at zoom {:.2}{}",
            camera.center.lat,
            camera.center.lng,
            camera.zoom,
            if reframed { " (fitted)" } else { "" }
        )
        .dimmed()
    ));

    CommandOutput::new(json!({
        "markers": markers,
        "camera": camera,
        "reframed": reframed,
        "selected": controller.map().selected(),
        "list_category": controller.criteria().category.to_string(),
    }))
    .with_text(text)
    .print(output)
}
