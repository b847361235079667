use transit_router::{
    ingestion::{catalogue::load_catalogue_file, gtfs::load_gtfs},
    routing::TransportRouter,
    structures::{Catalogue, LatLng, RoutingSettings, StopID},
};

#[test]
fn gtfs_feed_becomes_one_line_per_direction() {
    let mut catalogue = Catalogue::new();
    load_gtfs("tests/fixtures/gtfs", &mut catalogue).unwrap();

    // S4 shares its name with S2 and S5 has no name.
    assert_eq!(catalogue.stop_count(), 3);
    assert_eq!(catalogue.stop_id("Gare"), Some(StopID(0)));
    assert_eq!(catalogue.stop_id("Bourse"), Some(StopID(1)));
    assert_eq!(catalogue.stop_id("Parc"), Some(StopID(2)));

    let outbound = catalogue.get_bus(catalogue.bus_id("1").unwrap()).unwrap();
    assert_eq!(outbound.stops, vec![StopID(0), StopID(1), StopID(2)]);
    assert!(outbound.is_roundtrip);

    let inbound = catalogue
        .get_bus(catalogue.bus_id("1 (return)").unwrap())
        .unwrap();
    assert_eq!(inbound.stops, vec![StopID(2), StopID(1), StopID(0)]);

    let gare_bourse = catalogue.distance(StopID(0), StopID(1)).unwrap();
    assert!(gare_bourse > 550 && gare_bourse < 700);
}

#[test]
fn gtfs_distances_do_not_override_declared_ones() {
    let mut catalogue = Catalogue::new();
    load_catalogue_file("tests/fixtures/catalogue.yml", &mut catalogue).unwrap();
    let gare = catalogue.add_stop(
        "Gare",
        LatLng {
            latitude: 50.8450,
            longitude: 4.3570,
        },
    );
    let bourse = catalogue.add_stop(
        "Bourse",
        LatLng {
            latitude: 50.8480,
            longitude: 4.3490,
        },
    );
    catalogue.set_distance(gare, bourse, 42);

    load_gtfs("tests/fixtures/gtfs", &mut catalogue).unwrap();

    assert_eq!(catalogue.stop_count(), 10);
    assert_eq!(catalogue.distance(gare, bourse), Some(42));
    assert_eq!(catalogue.buses().len(), 5);
}

#[test]
fn gtfs_catalogue_is_routable() {
    let mut catalogue = Catalogue::new();
    load_gtfs("tests/fixtures/gtfs", &mut catalogue).unwrap();

    let router = TransportRouter::new(
        catalogue,
        RoutingSettings {
            bus_wait_time: 2.0,
            bus_velocity: 20.0,
        },
    )
    .unwrap();

    let there = router.find_route("Gare", "Parc").unwrap().unwrap();
    assert_eq!(there.items.len(), 2);
    let back = router.find_route("Parc", "Gare").unwrap().unwrap();
    assert_eq!(back.items.len(), 2);
}
