/// Points for the first `(minimum, points)` row that `value` reaches.
/// Rows are ordered from the highest minimum down.
pub(crate) fn at_least(value: f64, table: &[(f64, u32)]) -> u32 {
    table
        .iter()
        .find(|(min, _)| value >= *min)
        .map_or(0, |(_, points)| *points)
}

/// Points for the first `(maximum, points)` row that `value` stays under.
/// Rows are ordered from the lowest maximum up.
pub(crate) fn at_most(value: f64, table: &[(f64, u32)]) -> u32 {
    table
        .iter()
        .find(|(max, _)| value <= *max)
        .map_or(0, |(_, points)| *points)
}
