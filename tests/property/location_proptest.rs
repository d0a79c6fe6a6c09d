//! Property-based tests for location helpers

use proptest::prelude::*;
use ridedash::client::location::{coordinates_to_pixel, pixel_to_coordinates};
use ridedash::client::{LocationProvider, MapViewport, SampleLocationProvider};
use ridedash::shared::location::{format_location_for_api, haversine_km, Coordinates, LocationData};

fn coordinates() -> impl Strategy<Value = Coordinates> {
    (-89.0f64..89.0, -179.0f64..179.0).prop_map(|(lat, lng)| Coordinates::new(lat, lng))
}

proptest! {
    #[test]
    fn test_short_queries_return_nothing(query in ".{0,1}") {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let provider = SampleLocationProvider::for_position(None);
        let results = runtime.block_on(provider.search_locations(&query));
        prop_assert!(results.is_empty());
    }

    #[test]
    fn test_missing_address_is_synthesized(point in coordinates()) {
        let location = format_location_for_api(&LocationData::new(point, None));
        prop_assert_eq!(
            location.address,
            format!("{:.4}, {:.4}", point.latitude, point.longitude)
        );
        prop_assert_eq!(location.latitude, point.latitude);
        prop_assert_eq!(location.longitude, point.longitude);
    }

    #[test]
    fn test_haversine_symmetric(a in coordinates(), b in coordinates()) {
        let there = haversine_km(a, b);
        let back = haversine_km(b, a);
        prop_assert!(there >= 0.0);
        prop_assert!((there - back).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_mapping_inverts(x in 0.0f64..800.0, y in 0.0f64..600.0) {
        let viewport = MapViewport::new(800.0, 600.0);
        let point = pixel_to_coordinates(viewport, x, y);
        let (px, py) = coordinates_to_pixel(viewport, point);
        prop_assert!((px - x).abs() < 1e-6);
        prop_assert!((py - y).abs() < 1e-6);
    }
}
