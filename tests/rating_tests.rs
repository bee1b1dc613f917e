//! Cargo rating and decay tests
//!
//! Drives `Station::update_cargo` with scripted random sources so the
//! spoilage paths can be checked exactly.

use std::collections::VecDeque;

use station_sim::simulation::{
    CargoId, CargoObject, CargoStat, Companies, CompanyId, Invalidation, ObjectManager,
    RandomSource, SimRng, SimWorld, Station, StationId, StationTab, WindowManager,
    STATION_FLAG_PICKUP,
};

/// Always rolls the lowest value
struct MinRandom;

impl RandomSource for MinRandom {
    fn rand_next(&mut self, low: i32, _high: i32) -> i32 {
        low
    }
}

/// Always rolls the highest value
struct MaxRandom;

impl RandomSource for MaxRandom {
    fn rand_next(&mut self, _low: i32, high: i32) -> i32 {
        high
    }
}

/// Replays a fixed list of rolls and records the ranges asked for
struct ScriptedRandom {
    rolls: VecDeque<i32>,
    ranges: Vec<(i32, i32)>,
}

impl ScriptedRandom {
    fn new(rolls: &[i32]) -> Self {
        Self {
            rolls: rolls.iter().copied().collect(),
            ranges: Vec::new(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn rand_next(&mut self, low: i32, high: i32) -> i32 {
        self.ranges.push((low, high));
        let roll = self.rolls.pop_front().expect("ran out of scripted rolls");
        assert!(roll >= low && roll <= high, "roll {} outside {}..={}", roll, low, high);
        roll
    }
}

fn passengers() -> CargoId {
    CargoId::new(0).unwrap()
}

fn mail() -> CargoId {
    CargoId::new(1).unwrap()
}

fn player_station() -> Station {
    Station::new(StationId(3), CompanyId(0))
}

fn stat(age: u8, quantity: u16, vehicle_speed: u8, vehicle_age: u8) -> CargoStat {
    CargoStat {
        quantity,
        origin: StationId(3),
        age,
        vehicle_speed,
        vehicle_age,
        ..CargoStat::default()
    }
}

/// Station holding one waiting cargo with the given rating
fn station_with_cargo(rating: u8, age: u8, quantity: u16) -> Station {
    let mut station = player_station();
    *station.cargo_mut(passengers()) = CargoStat {
        rating,
        ..stat(age, quantity, 0, u8::MAX)
    };
    station
}

#[test]
fn test_fresh_well_served_cargo_is_capped() {
    let station = player_station();
    let companies = Companies::default();

    assert_eq!(
        station.calculate_cargo_rating(&stat(5, 50, 20, 0), &companies),
        200
    );
}

#[test]
fn test_default_stat_rating() {
    let station = player_station();
    let companies = Companies::default();

    assert_eq!(
        station.calculate_cargo_rating(&CargoStat::default(), &companies),
        165
    );
}

#[test]
fn test_rating_tiers_by_age() {
    let station = player_station();
    let companies = Companies::default();
    let rating = |age| station.calculate_cargo_rating(&stat(age, 0, 0, u8::MAX), &companies);

    assert_eq!(rating(7), 165);
    assert_eq!(rating(8), 130);
    assert_eq!(rating(15), 130);
    assert_eq!(rating(16), 85);
    assert_eq!(rating(31), 40);
    assert_eq!(rating(45), 40);
    assert_eq!(rating(46), 0);
}

#[test]
fn test_rating_tiers_by_quantity() {
    let station = player_station();
    let companies = Companies::default();
    let rating =
        |quantity| station.calculate_cargo_rating(&stat(0, quantity, 0, u8::MAX), &companies);

    assert_eq!(rating(100), 165);
    assert_eq!(rating(150), 145);
    assert_eq!(rating(250), 125);
    assert_eq!(rating(400), 95);
    assert_eq!(rating(800), 65);
    assert_eq!(rating(1200), 35);
}

#[test]
fn test_rating_vehicle_bonuses() {
    let station = player_station();
    let companies = Companies::default();
    let rating = |speed, vehicle_age| {
        station.calculate_cargo_rating(&stat(46, 0, speed, vehicle_age), &companies)
    };

    assert_eq!(rating(34, u8::MAX), 8);
    assert_eq!(rating(35, u8::MAX), 0);
    assert_eq!(rating(u8::MAX, u8::MAX), 0);
    assert_eq!(rating(0, 3), 10);
    assert_eq!(rating(0, 1), 20);
    assert_eq!(rating(0, 0), 33);
}

#[test]
fn test_unserviced_ai_station_is_rated_fixed() {
    let station = Station::new(StationId(4), CompanyId(1));
    let companies = Companies::default();

    assert_eq!(
        station.calculate_cargo_rating(&stat(255, 2000, 0, u8::MAX), &companies),
        120
    );
    // Vehicle bonuses still apply on top
    assert_eq!(
        station.calculate_cargo_rating(&stat(255, 2000, 20, 0), &companies),
        158
    );
}

#[test]
fn test_serviced_ai_station_uses_formula() {
    let mut station = Station::new(StationId(4), CompanyId(1));
    station.flags |= STATION_FLAG_PICKUP;
    let companies = Companies::default();

    assert_eq!(
        station.calculate_cargo_rating(&stat(255, 2000, 0, u8::MAX), &companies),
        0
    );
}

#[test]
fn test_human_company_is_never_overridden() {
    let station = Station::new(StationId(4), CompanyId(2));
    let mut companies = Companies::default();
    companies.add_human(CompanyId(2));

    assert_eq!(
        station.calculate_cargo_rating(&stat(255, 2000, 0, u8::MAX), &companies),
        0
    );
}

#[test]
fn test_rating_moves_at_most_two_per_update() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();

    let mut rising = player_station();
    *rising.cargo_mut(passengers()) = CargoStat {
        rating: 0,
        ..stat(0, 10, 20, 0)
    };
    rising.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert_eq!(rising.cargo(passengers()).rating, 2);

    let mut falling = station_with_cargo(200, 100, 0);
    falling.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert_eq!(falling.cargo(passengers()).rating, 198);

    // Within two of the target it lands exactly
    let mut close = player_station();
    *close.cargo_mut(passengers()) = CargoStat {
        rating: 164,
        ..stat(0, 0, 0, u8::MAX)
    };
    close.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert_eq!(close.cargo(passengers()).rating, 165);
}

#[test]
fn test_large_pile_with_poor_rating_spoils() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();

    let mut station = station_with_cargo(10, 255, 600);
    station.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert_eq!(station.cargo(passengers()).rating, 8);
    assert_eq!(station.cargo(passengers()).quantity, 599);

    let mut station = station_with_cargo(10, 255, 600);
    station.update_cargo(&companies, &mut MaxRandom, &mut windows);
    assert_eq!(station.cargo(passengers()).quantity, 600 - 32 - 4);
}

#[test]
fn test_medium_pile_with_poor_rating_spoils_less() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();

    let mut station = station_with_cargo(10, 255, 250);
    station.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert_eq!(station.cargo(passengers()).quantity, 249);

    let mut station = station_with_cargo(10, 255, 250);
    station.update_cargo(&companies, &mut MaxRandom, &mut windows);
    assert_eq!(station.cargo(passengers()).quantity, 250 - 8 - 4);
}

#[test]
fn test_seeded_decay_stays_in_range() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();
    let mut world = SimWorld::with_map_size(8, 8, Some(99));
    let id = world.add_station(CompanyId(0)).unwrap();
    {
        let station = world.station_mut(id).unwrap();
        station.add_waiting_cargo(passengers(), 250, id);
        station.cargo_mut(passengers()).rating = 10;
        station.cargo_mut(passengers()).age = 255;
    }

    world.update_cargo_rating_and_decay(id);
    let quantity = world.station(id).unwrap().cargo(passengers()).quantity;
    assert!((238..=249).contains(&quantity), "quantity {}", quantity);

    // Same checks through the station directly
    let mut station = station_with_cargo(10, 255, 250);
    let mut rng = SimRng::from_seed(99);
    station.update_cargo(&companies, &mut rng, &mut windows);
    assert!((238..=249).contains(&station.cargo(passengers()).quantity));
}

#[test]
fn test_decay_draws_in_order() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();
    let mut rng = ScriptedRandom::new(&[5, 9, 3]);

    let mut station = station_with_cargo(10, 255, 600);
    station.update_cargo(&companies, &mut rng, &mut windows);

    assert_eq!(rng.ranges, vec![(1, 32), (0, 127), (1, 4)]);
    assert!(rng.rolls.is_empty());
    assert_eq!(station.cargo(passengers()).quantity, 600 - 5 - 3);
}

#[test]
fn test_random_loss_needs_low_rating_roll() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();

    // Rating ends at 60: no spoilage, loss only when the roll is at least 60
    let mut station = station_with_cargo(62, 255, 50);
    let mut rng = ScriptedRandom::new(&[59]);
    station.update_cargo(&companies, &mut rng, &mut windows);
    assert_eq!(station.cargo(passengers()).rating, 60);
    assert_eq!(station.cargo(passengers()).quantity, 50);

    let mut station = station_with_cargo(62, 255, 50);
    let mut rng = ScriptedRandom::new(&[60, 2]);
    station.update_cargo(&companies, &mut rng, &mut windows);
    assert_eq!(station.cargo(passengers()).quantity, 48);
}

#[test]
fn test_small_pile_never_underflows() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();

    let mut station = station_with_cargo(10, 255, 2);
    station.update_cargo(&companies, &mut MaxRandom, &mut windows);
    assert_eq!(station.cargo(passengers()).quantity, 0);
}

#[test]
fn test_good_rating_is_reported() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();

    let mut station = station_with_cargo(150, 0, 10);
    assert!(station.update_cargo(&companies, &mut MinRandom, &mut windows));
    assert_eq!(station.cargo(passengers()).quantity, 10);

    let mut station = station_with_cargo(60, 255, 10);
    assert!(!station.update_cargo(&companies, &mut MinRandom, &mut windows));
}

#[test]
fn test_ages_and_counters_saturate() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();

    let mut station = player_station();
    station.age_counters = [254, 255];
    station.add_waiting_cargo(passengers(), 5, StationId(9));
    station.cargo_mut(passengers()).enroute_age = 254;
    station.add_waiting_cargo(mail(), 5, station.id);
    station.cargo_mut(mail()).age = 255;

    station.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert_eq!(station.age_counters, [255, 255]);
    assert_eq!(station.cargo(passengers()).enroute_age, 255);
    assert_eq!(station.cargo(passengers()).age, 1);
    assert_eq!(station.cargo(mail()).enroute_age, 0);
    assert_eq!(station.cargo(mail()).age, 255);

    station.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert_eq!(station.cargo(passengers()).enroute_age, 255);
}

#[test]
fn test_unused_stats_are_left_alone() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();

    let mut station = player_station();
    station.cargo_mut(mail()).rating = 7;
    assert!(!station.update_cargo(&companies, &mut MaxRandom, &mut windows));

    let untouched = station.cargo(mail());
    assert_eq!(untouched.rating, 7);
    assert_eq!(untouched.age, 0);
    assert!(untouched.is_empty());
}

#[test]
fn test_window_redraw_depends_on_tab_and_quantity() {
    let companies = Companies::default();

    // No window open
    let mut windows = WindowManager::new();
    let mut station = station_with_cargo(10, 255, 600);
    station.update_cargo(&companies, &mut MaxRandom, &mut windows);
    assert!(windows.drain().is_empty());

    // Overview tab, nothing lost
    windows.open_station_window(StationId(3), StationTab::Overview);
    let mut station = station_with_cargo(150, 0, 10);
    station.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert!(windows.drain().is_empty());

    // Overview tab, cargo lost
    let mut station = station_with_cargo(10, 255, 600);
    station.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert_eq!(windows.drain(), vec![Invalidation::StationWindow(StationId(3))]);

    // Cargo tab redraws every update
    windows.open_station_window(StationId(3), StationTab::CargoRatings);
    let mut station = station_with_cargo(150, 0, 10);
    station.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert_eq!(windows.drain(), vec![Invalidation::StationWindow(StationId(3))]);

    windows.close_station_window(StationId(3));
    station.update_cargo(&companies, &mut MinRandom, &mut windows);
    assert!(windows.drain().is_empty());
}

#[test]
fn test_record_pickup_resets_age_and_marks_station() {
    let mut station = player_station();
    station.add_waiting_cargo(passengers(), 40, station.id);
    station.cargo_mut(passengers()).age = 90;

    station.record_pickup(passengers(), 30, 2);

    let stat = station.cargo(passengers());
    assert_eq!(stat.age, 0);
    assert_eq!(stat.vehicle_speed, 30);
    assert_eq!(stat.vehicle_age, 2);
    assert_ne!(station.flags & STATION_FLAG_PICKUP, 0);
}

#[test]
fn test_status_string_lists_waiting_cargo() {
    let mut objects = ObjectManager::new();
    objects
        .add_cargo(CargoObject {
            name: "Passengers".to_string(),
            unit_singular: "passenger".to_string(),
            unit_plural: "passengers".to_string(),
        })
        .unwrap();
    objects
        .add_cargo(CargoObject {
            name: "Mail".to_string(),
            unit_singular: "bag of mail".to_string(),
            unit_plural: "bags of mail".to_string(),
        })
        .unwrap();

    let mut station = player_station();
    assert_eq!(station.status_string(&objects), "Nothing waiting");

    station.add_waiting_cargo(passengers(), 12, station.id);
    station.add_waiting_cargo(mail(), 1, station.id);
    assert_eq!(
        station.status_string(&objects),
        "12 passengers, 1 bag of mail waiting"
    );

    station.add_waiting_cargo(CargoId::new(5).unwrap(), 3, station.id);
    assert_eq!(
        station.status_string(&objects),
        "12 passengers, 1 bag of mail, 3 units waiting"
    );
}

#[test]
fn test_invalidate_requests_viewport_redraw() {
    let mut windows = WindowManager::new();
    let station = player_station();

    station.invalidate(&mut windows);
    station.invalidate_window(&mut windows);

    assert_eq!(
        windows.drain(),
        vec![
            Invalidation::Viewport(StationId(3)),
            Invalidation::StationWindow(StationId(3)),
        ]
    );
}

#[test]
fn test_world_tick_reports_well_served_stations() {
    let mut world = SimWorld::with_map_size(16, 16, Some(5));
    let served = world.add_station(CompanyId(0)).unwrap();
    let neglected = world.add_station(CompanyId(0)).unwrap();
    world
        .station_mut(served)
        .unwrap()
        .add_waiting_cargo(passengers(), 10, served);
    {
        let station = world.station_mut(neglected).unwrap();
        station.add_waiting_cargo(passengers(), 10, neglected);
        station.cargo_mut(passengers()).rating = 20;
        station.cargo_mut(passengers()).age = 255;
    }

    assert_eq!(world.tick(), vec![served]);
    assert_eq!(world.ticks, 1);
    assert!(!world.update_cargo_rating_and_decay(StationId(40)));
}

#[test]
fn test_ratings_stay_bounded_over_many_ticks() {
    let mut world = SimWorld::create_test_world_with_seed(11);
    let snapshot = |world: &SimWorld| -> Vec<(StationId, CargoId, u8)> {
        world
            .stations()
            .flat_map(|station| {
                CargoId::all()
                    .filter(|cargo| !station.cargo(*cargo).is_empty())
                    .map(|cargo| (station.id, cargo, station.cargo(cargo).rating))
                    .collect::<Vec<_>>()
            })
            .collect()
    };

    let mut before = snapshot(&world);
    for _ in 0..400 {
        world.tick();
        let after = snapshot(&world);
        for ((id, cargo, old), (_, _, new)) in before.iter().zip(&after) {
            assert!(*new <= 200, "station {:?} cargo {:?} rating {}", id, cargo, new);
            assert!(
                (*new as i32 - *old as i32).abs() <= 2,
                "station {:?} cargo {:?} moved {} -> {}",
                id,
                cargo,
                old,
                new
            );
        }
        before = after;
    }
}

/// Ignores the requested range entirely
struct WildRandom(i32);

impl RandomSource for WildRandom {
    fn rand_next(&mut self, _low: i32, _high: i32) -> i32 {
        self.0
    }
}

#[test]
fn test_out_of_range_rolls_are_clamped() {
    let companies = Companies::default();
    let mut windows = WindowManager::new();

    // A negative roll counts as the smallest loss
    let mut station = station_with_cargo(10, 255, 600);
    station.update_cargo(&companies, &mut WildRandom(-5), &mut windows);
    assert_eq!(station.cargo(passengers()).quantity, 599);

    // An oversized roll counts as the largest loss
    let mut station = station_with_cargo(10, 255, 600);
    station.update_cargo(&companies, &mut WildRandom(100_000), &mut windows);
    assert_eq!(station.cargo(passengers()).quantity, 600 - 32 - 4);
}
