use chrono::Month;

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Month for a zero-based index, wrapping past December.
pub fn month_at(index: usize) -> Month {
    MONTHS[index % 12]
}

/// Expected auction-price pressure for a month. Below 1 suppresses cost,
/// above 1 inflates it.
pub fn factor(month: Month) -> f64 {
    match month {
        Month::January => 0.82,
        Month::February => 0.85,
        Month::March => 0.93,
        Month::April => 0.96,
        Month::May => 1.00,
        Month::June => 1.05,
        Month::July => 1.02,
        Month::August => 1.08,
        Month::September => 1.12,
        Month::October => 1.18,
        Month::November => 1.35,
        Month::December => 1.45,
    }
}

pub fn short_name(month: Month) -> String {
    month.name()[..3].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_wraps_around_the_year() {
        assert_eq!(month_at(0), Month::January);
        assert_eq!(month_at(5), Month::June);
        assert_eq!(month_at(17), Month::June);
    }

    #[test]
    fn year_end_is_most_expensive() {
        assert_eq!(factor(Month::December), 1.45);
        assert_eq!(factor(Month::January), 0.82);
        let peak = MONTHS
            .iter()
            .map(|m| factor(*m))
            .fold(f64::MIN, f64::max);
        assert_eq!(peak, 1.45);
    }

    #[test]
    fn short_names() {
        assert_eq!(short_name(Month::June), "Jun");
        assert_eq!(short_name(Month::September), "Sep");
    }
}
