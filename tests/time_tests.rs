use fahrplan::shared::time::Time;

#[test]
fn parse_format_identity_midnight() {
    let time = "00:00:00";
    assert_eq!(Time::parse_hms(time).unwrap().to_hms_string(), time);
}

#[test]
fn parse_format_identity_noon() {
    let time = "12:00:00";
    assert_eq!(Time::parse_hms(time).unwrap().to_hms_string(), time);
}

#[test]
fn parse_format_identity_end_of_day() {
    let time = "23:59:59";
    assert_eq!(Time::parse_hms(time).unwrap().to_hms_string(), time);
}

#[test]
fn strict_parser_rejects_missing_minutes() {
    assert!(Time::parse_hms("12").is_err());
}

#[test]
fn strict_parser_rejects_out_of_range_minutes() {
    assert!(Time::parse_hms("12:61").is_err());
}

#[test]
fn lenient_parser_reads_schedule_times() {
    assert_eq!(Time::parse_gtfs("08:05:00").as_seconds(), 8 * 3600 + 300);
}

#[test]
fn lenient_parser_zeroes_broken_times() {
    assert_eq!(Time::parse_gtfs("not a time"), Time::ZERO);
}

#[test]
fn late_night_schedule_times_carry_days() {
    let time = Time::parse_gtfs("25:30:00");
    assert_eq!(time.days(), 1);
    assert_eq!(time.hours(), 1);
    assert_eq!(time.minutes(), 30);
}

#[test]
fn hm_string_drops_seconds() {
    assert_eq!(Time::parse_gtfs("09:41:59").to_hm_string(), "09:41");
}
