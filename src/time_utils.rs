/// Spacing of labelled ticks on the price chart's time axis.
pub const TICK_LABEL_STEP_SECS: i64 = 30;

/// `HH:MM:SS` of a Unix timestamp in UTC.
pub fn format_time_of_day(timestamp_secs: i64) -> String {
    let secs = timestamp_secs.rem_euclid(86_400);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Axis label for a tick, only on 30-second boundaries.
pub fn format_tick_label(timestamp_secs: i64) -> Option<String> {
    (timestamp_secs.rem_euclid(TICK_LABEL_STEP_SECS) == 0)
        .then(|| format_time_of_day(timestamp_secs))
}

/// Labelled tick times inside `[from, to]`.
pub fn tick_times(from: f64, to: f64) -> impl Iterator<Item = i64> {
    let step = TICK_LABEL_STEP_SECS;
    let first = (from / step as f64).ceil() as i64 * step;
    let last = to.floor() as i64;
    (first..=last).step_by(step as usize)
}

/// Elapsed milliseconds as `m:ss`.
pub fn format_elapsed(elapsed_ms: f64) -> String {
    let total_secs = (elapsed_ms.max(0.0) / 1000.0).floor() as u64;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Thousands separators and at most two fraction digits (`50,020.5`).
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return "—".to_string();
    }
    let rounded = (price.abs() * 100.0).round() as u64;
    let whole = rounded / 100;
    let cents = rounded % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price < 0.0 && rounded > 0 { "-" } else { "" };
    match cents {
        0 => format!("{}{}", sign, grouped),
        c if c % 10 == 0 => format!("{}{}.{}", sign, grouped, c / 10),
        c => format!("{}{}.{:02}", sign, grouped, c),
    }
}
