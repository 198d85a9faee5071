/// Fraction of the parent venue a unit code stands for: "Q*" is a quarter,
/// "H*" a half, anything else (including no unit at all) the whole venue.
/// Total function — an unrecognized code counts as the whole venue, which
/// over-reports rather than under-reports occupancy.
pub fn fraction_for_unit_code(code: Option<&str>) -> f64 {
    match code.and_then(|c| c.chars().next()) {
        Some(c) if c.eq_ignore_ascii_case(&'q') => 0.25,
        Some(c) if c.eq_ignore_ascii_case(&'h') => 0.5,
        _ => 1.0,
    }
}
