//! Catchment region tests
//!
//! Checks the regions flagged for each kind of station part and the
//! behaviour of the shared flag workspace.

use station_sim::simulation::{
    station_part_catchment, AirportObject, CargoId, CargoObject, CatchmentFlag, CompanyId, MapPos3,
    ObjectId, RoadStationObject, SimWorld, StationElement, StationId, StationPart, StationType,
    TilePos, TileRect, ROAD_STATION_PASSENGER,
};

fn test_world() -> SimWorld {
    let mut world = SimWorld::with_map_size(32, 32, Some(1));
    world
        .objects
        .add_cargo(CargoObject {
            name: "Passengers".to_string(),
            unit_singular: "passenger".to_string(),
            unit_plural: "passengers".to_string(),
        })
        .unwrap();
    world
}

fn add_bus_stop_object(world: &mut SimWorld) -> ObjectId {
    let passengers = CargoId::new(0).unwrap();
    world
        .objects
        .add_road_station(RoadStationObject {
            name: "Bus Stop".to_string(),
            flags: ROAD_STATION_PASSENGER,
            cargo: passengers,
        })
        .unwrap()
}

fn add_airport_object(world: &mut SimWorld) -> ObjectId {
    world
        .objects
        .add_airport(AirportObject {
            name: "Airfield".to_string(),
            min_x: -32,
            min_y: -32,
            max_x: 96,
            max_y: 64,
        })
        .unwrap()
}

fn rect(min: (i32, i32), max: (i32, i32)) -> TileRect {
    TileRect::new(TilePos::new(min.0, min.1), TilePos::new(max.0, max.1))
}

#[test]
fn test_road_stop_catchment_is_symmetric() {
    let mut world = test_world();
    let bus_stop = add_bus_stop_object(&mut world);
    let station = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(station, StationPart::Road { object: bus_stop }, TilePos::new(10, 10), 0)
        .unwrap();

    let bounds = world.set_catchment_display(station, CatchmentFlag::DISPLAY);
    assert_eq!(bounds, Some(rect((6, 6), (14, 14))));

    let tiles = world.catchment_tiles(CatchmentFlag::DISPLAY);
    assert_eq!(tiles.len(), 81);
    assert!(tiles.contains(&TilePos::new(6, 6)));
    assert!(tiles.contains(&TilePos::new(14, 14)));
    assert!(!tiles.contains(&TilePos::new(15, 10)));
}

#[test]
fn test_dock_catchment_covers_two_by_two_footprint() {
    let mut world = test_world();
    let station = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(station, StationPart::Docks, TilePos::new(10, 10), 0)
        .unwrap();

    let bounds = world.set_catchment_display(station, CatchmentFlag::DISPLAY);
    assert_eq!(bounds, Some(rect((6, 6), (15, 15))));
    assert_eq!(world.catchment_tiles(CatchmentFlag::DISPLAY).len(), 100);
}

#[test]
fn test_catchment_is_clamped_to_map_edges() {
    let mut world = test_world();
    let station = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(station, StationPart::Train, TilePos::new(1, 30), 0)
        .unwrap();

    let bounds = world.set_catchment_display(station, CatchmentFlag::DISPLAY);
    assert_eq!(bounds, Some(rect((0, 26), (5, 31))));
    assert_eq!(world.catchment_tiles(CatchmentFlag::DISPLAY).len(), 36);
}

#[test]
fn test_airport_catchment_follows_rotated_footprint() {
    let mut world = test_world();
    let airport = add_airport_object(&mut world);
    let pos = MapPos3::new(320, 320, 0);

    let unrotated = StationElement {
        station_id: StationId(0),
        station_type: StationType::Airport,
        object_id: airport,
        rotation: 0,
        being_removed: false,
    };
    assert_eq!(
        station_part_catchment(&unrotated, pos, &world.objects),
        Some(rect((5, 5), (17, 16)))
    );

    let rotated = StationElement {
        rotation: 1,
        ..unrotated
    };
    assert_eq!(
        station_part_catchment(&rotated, pos, &world.objects),
        Some(rect((5, 3), (16, 15)))
    );
}

#[test]
fn test_airport_without_object_has_no_catchment() {
    let world = test_world();
    let element = StationElement {
        station_id: StationId(0),
        station_type: StationType::Airport,
        object_id: ObjectId(42),
        rotation: 0,
        being_removed: false,
    };
    assert_eq!(
        station_part_catchment(&element, MapPos3::new(320, 320, 0), &world.objects),
        None
    );
}

#[test]
fn test_catchment_display_is_idempotent() {
    let mut world = test_world();
    let bus_stop = add_bus_stop_object(&mut world);
    let station = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(station, StationPart::Road { object: bus_stop }, TilePos::new(4, 4), 0)
        .unwrap();
    world
        .add_station_part(station, StationPart::Docks, TilePos::new(20, 18), 0)
        .unwrap();

    world.set_catchment_display(station, CatchmentFlag::DISPLAY);
    let first = world.catchment_tiles(CatchmentFlag::DISPLAY);
    world.set_catchment_display(station, CatchmentFlag::DISPLAY);
    let second = world.catchment_tiles(CatchmentFlag::DISPLAY);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_catchment_display_replaces_previous_station() {
    let mut world = test_world();
    let first = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(first, StationPart::Train, TilePos::new(5, 5), 0)
        .unwrap();
    let second = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(second, StationPart::Train, TilePos::new(25, 25), 0)
        .unwrap();

    world.set_catchment_display(first, CatchmentFlag::DISPLAY);
    world.set_catchment_display(second, CatchmentFlag::DISPLAY);

    let tiles = world.catchment_tiles(CatchmentFlag::DISPLAY);
    assert!(!tiles.contains(&TilePos::new(5, 5)));
    assert!(tiles.contains(&TilePos::new(25, 25)));
}

#[test]
fn test_null_station_clears_catchment_display() {
    let mut world = test_world();
    let station = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(station, StationPart::Train, TilePos::new(5, 5), 0)
        .unwrap();
    world.set_catchment_display(station, CatchmentFlag::DISPLAY);

    assert_eq!(world.set_catchment_display(StationId::NULL, CatchmentFlag::DISPLAY), None);
    assert!(world.catchment_tiles(CatchmentFlag::DISPLAY).is_empty());
}

#[test]
fn test_acceptance_search_leaves_display_flag_alone() {
    let mut world = test_world();
    let shown = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(shown, StationPart::Train, TilePos::new(5, 5), 0)
        .unwrap();
    let other = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(other, StationPart::Train, TilePos::new(20, 20), 0)
        .unwrap();

    world.set_catchment_display(shown, CatchmentFlag::DISPLAY);
    let before = world.catchment_tiles(CatchmentFlag::DISPLAY);
    world.compute_accepted_cargo(other);

    assert_eq!(world.catchment_tiles(CatchmentFlag::DISPLAY), before);
    assert!(world
        .catchment_tiles(CatchmentFlag::ACCEPTANCE)
        .contains(&TilePos::new(20, 20)));
}

#[test]
fn test_station_part_levels_are_distinguished() {
    let mut world = test_world();
    let station = world.add_station(CompanyId(0)).unwrap();
    world
        .add_station_part(station, StationPart::Train, TilePos::new(10, 10), 2)
        .unwrap();

    // Part recorded at level 2; an element at level 0 on the same tile must not match
    assert!(world.map.station_element(MapPos3::new(320, 320, 0)).is_none());
    assert!(world.map.station_element(MapPos3::new(320, 320, 8)).is_some());
    assert!(world.set_catchment_display(station, CatchmentFlag::DISPLAY).is_some());
}

#[test]
fn test_station_part_outside_map_is_rejected() {
    let mut world = test_world();
    let station = world.add_station(CompanyId(0)).unwrap();
    assert!(world
        .add_station_part(station, StationPart::Train, TilePos::new(40, 2), 0)
        .is_err());
    assert!(world
        .add_station_part(StationId(77), StationPart::Train, TilePos::new(2, 2), 0)
        .is_err());
}

#[test]
fn test_station_id_from_index_out_of_range_is_null() {
    assert_eq!(StationId::from_index(3), StationId(3));
    assert!(StationId::from_index(1024).is_null());
    assert!(StationId::from_index(usize::MAX).is_null());
}
