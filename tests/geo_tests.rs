use fahrplan::shared::geo::{CompassDirection, Coordinate, walking_directions};

#[test]
fn haversine_is_symmetric() {
    let a = Coordinate::new(49.0094, 8.4044);
    let b = Coordinate::new(48.9937, 8.4021);
    let there = a.haversine_distance(&b);
    let back = b.haversine_distance(&a);
    assert!((there.as_meters() - back.as_meters()).abs() < 1e-6);
}

#[test]
fn haversine_short_hop() {
    // Two platforms about 150m apart.
    let a = Coordinate::new(49.00935, 8.40444);
    let b = Coordinate::new(49.01070, 8.40444);
    let distance = a.haversine_distance(&b);
    assert!((distance.as_meters() - 150.0).abs() < 2.0);
}

#[test]
fn compass_all_eight_buckets() {
    let cases = [
        (0.0, CompassDirection::North),
        (45.0, CompassDirection::Northeast),
        (90.0, CompassDirection::East),
        (135.0, CompassDirection::Southeast),
        (180.0, CompassDirection::South),
        (225.0, CompassDirection::Southwest),
        (270.0, CompassDirection::West),
        (315.0, CompassDirection::Northwest),
    ];
    for (degrees, expected) in cases {
        assert_eq!(CompassDirection::from_degrees(degrees), expected);
    }
}

#[test]
fn compass_north_wraps_across_zero() {
    assert_eq!(CompassDirection::from_degrees(337.5), CompassDirection::North);
    assert_eq!(CompassDirection::from_degrees(359.9), CompassDirection::North);
    assert_eq!(CompassDirection::from_degrees(22.4), CompassDirection::North);
}

#[test]
fn compass_labels_are_german() {
    assert_eq!(CompassDirection::Southwest.to_string(), "Südwesten");
}

#[test]
fn walking_directions_south() {
    let from = Coordinate::new(49.0027, 8.4);
    let to = Coordinate::new(49.0, 8.4);
    let [line, _] = walking_directions(&from, &to, 1.5);
    assert!(line.contains("Richtung Süden"));
}
