use derive_builder::Builder;
use itertools::Itertools;
use tracing::{debug, warn};

use crate::banner::{BannerDocument, NumberedMap};
use crate::geo::LatLon;

pub const ROUTE_NAME_SUFFIX: &str = " from Bannergress";

#[derive(Clone, Debug, PartialEq, Builder)]
#[builder(private)]
pub struct Waypoint {
    pub latlon: LatLon,
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteDocument {
    /// Banner title as published; the delivered file is named after it.
    pub title: String,
    pub name: String,
    pub waypoints: Vec<Waypoint>,
}

fn in_key_order<T>(map: &NumberedMap<T>) -> impl Iterator<Item = &(u64, T)> {
    map.entries().iter().sorted_by_key(|(key, _)| *key)
}

/// Flattens the banner into route points, missions then steps, both by
/// ascending numeric key. Unavailable steps are dropped.
pub fn build(banner: &BannerDocument) -> RouteDocument {
    let mut waypoints = Vec::new();

    for (mission_key, mission) in in_key_order(&banner.missions) {
        for (step_key, step) in in_key_order(&mission.steps) {
            let poi = &step.poi;
            if !poi.is_available() {
                debug!(mission = mission_key, step = step_key, "Skipping unavailable step");
                continue;
            }

            let title = poi.title.clone().unwrap_or_default();
            let mut waypoint = WaypointBuilder::default();
            waypoint.name(title.clone()).description(title);
            if let Some(latlon) = LatLon::from_poi(poi.latitude, poi.longitude) {
                waypoint.latlon(latlon);
            }

            match waypoint.build() {
                Ok(waypoint) => waypoints.push(waypoint),
                Err(_) => warn!(
                    mission = mission_key,
                    step = step_key,
                    "Step has no coordinates, ignoring!"
                ),
            }
        }
    }

    RouteDocument {
        title: banner.title.clone(),
        name: format!("{}{}", banner.title, ROUTE_NAME_SUFFIX),
        waypoints,
    }
}
