pub const MONTHS_PER_YEAR: usize = 12;

/// Chart labels, January first.
pub const MONTH_LABELS: [&str; MONTHS_PER_YEAR] = [
    "Gen", "Feb", "Mar", "Apr", "Mag", "Giu", "Lug", "Ago", "Set", "Ott", "Nov", "Dic",
];

pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |running, v| {
            *running += v;
            Some(*running)
        })
        .collect()
}
