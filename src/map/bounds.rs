//! Web Mercator camera math.
//!
//! Positions are projected onto the unit square (x grows east, y grows
//! south) and scaled by `TILE_SIZE * 2^zoom` pixels, the convention the
//! hosted map tiles use.

use serde::Serialize;

use crate::types::Coordinates;

pub const TILE_SIZE: f64 = 512.0;

/// Latitude beyond which Web Mercator is undefined.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Padding, in pixels, kept between fitted markers and the viewport edge.
pub const FIT_PADDING: f64 = 60.0;

/// Fitting never zooms in further than this.
pub const FIT_MAX_ZOOM: f64 = 12.0;

/// Zoom used when flying to a single selected marker.
pub const FOCUS_ZOOM: f64 = 14.0;

/// An axis-aligned geographic box. Does not cross the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LngLatBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LngLatBounds {
    pub fn from_point(point: Coordinates) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    /// Smallest box holding every point; `None` for no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: Coordinates) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lng);
        self.east = self.east.max(point.lng);
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lng)
    }
}

/// Size of the map element in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
        }
    }
}

/// Where the map is looking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub center: Coordinates,
    pub zoom: f64,
}

impl Default for Camera {
    /// Whole-world view the map opens with.
    fn default() -> Self {
        Self {
            center: Coordinates::new(20.0, 0.0),
            zoom: 1.5,
        }
    }
}

fn project(point: Coordinates) -> (f64, f64) {
    let lat = point.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (point.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0;
    (x, y)
}

fn unproject(x: f64, y: f64) -> Coordinates {
    let lng = x * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y);
    let lat = n.sinh().atan().to_degrees();
    Coordinates::new(lat, lng)
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

impl Camera {
    /// Fly to a single point.
    pub fn focused_on(point: Coordinates) -> Self {
        Self {
            center: point,
            zoom: FOCUS_ZOOM,
        }
    }

    /// Camera that shows all of `bounds` inside `viewport`, keeping
    /// `padding` pixels clear on every side and never zooming past
    /// `max_zoom`.
    pub fn fit(bounds: &LngLatBounds, viewport: Viewport, padding: f64, max_zoom: f64) -> Self {
        let (west, north) = project(Coordinates::new(bounds.north, bounds.west));
        let (east, south) = project(Coordinates::new(bounds.south, bounds.east));
        let span_x = east - west;
        let span_y = south - north;

        let usable_w = (viewport.width - 2.0 * padding).max(1.0);
        let usable_h = (viewport.height - 2.0 * padding).max(1.0);

        let zoom_for = |span: f64, usable: f64| {
            if span > 0.0 {
                (usable / (span * TILE_SIZE)).log2()
            } else {
                f64::INFINITY
            }
        };
        let zoom = zoom_for(span_x, usable_w)
            .min(zoom_for(span_y, usable_h))
            .min(max_zoom)
            .max(0.0);

        Self {
            center: unproject((west + east) / 2.0, (north + south) / 2.0),
            zoom,
        }
    }

    /// Geographic box visible through `viewport` from this camera.
    pub fn visible_bounds(&self, viewport: Viewport) -> LngLatBounds {
        let (cx, cy) = project(self.center);
        let world = world_size(self.zoom);
        let half_w = viewport.width / 2.0 / world;
        let half_h = viewport.height / 2.0 / world;

        let north_west = unproject(cx - half_w, (cy - half_h).max(0.0));
        let south_east = unproject(cx + half_w, (cy + half_h).min(1.0));
        LngLatBounds {
            south: south_east.lat,
            west: north_west.lng,
            north: north_west.lat,
            east: south_east.lng,
        }
    }
}
