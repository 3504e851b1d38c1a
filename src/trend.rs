const WINDOW: usize = 4;

/// Least-squares slope over the last four rows. Missing values count as 0.
pub fn trend<T>(rows: &[T], field: impl Fn(&T) -> Option<f64>) -> f64 {
    if rows.len() < 2 {
        return 0.0;
    }

    let recent = &rows[rows.len().saturating_sub(WINDOW)..];
    let n = recent.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);

    for (i, row) in recent.iter().enumerate() {
        let x = i as f64;
        let y = field(row).filter(|v| v.is_finite()).unwrap_or(0.0);
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    if slope.is_finite() { slope } else { 0.0 }
}
