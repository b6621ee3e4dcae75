//! Shifts and their time-slot tables.

/// Time label used when a column has no slot in the shift's table.
pub const SLOT_NOT_FOUND: &str = "not found";

/// Daily session grouping a lesson query is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    First,
    Second,
    /// Any other non-zero shift number. Accepted, but has no time slots.
    Unrecognized,
}

impl Shift {
    /// Interpret a shift number. Zero means "no shift given".
    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            0 => None,
            1 => Some(Self::First),
            2 => Some(Self::Second),
            _ => Some(Self::Unrecognized),
        }
    }

    /// Time slot label for a 1-based column index.
    pub fn time_slot(self, column: usize) -> &'static str {
        match self {
            Self::First => first_shift_slot(column),
            Self::Second => second_shift_slot(column),
            Self::Unrecognized => SLOT_NOT_FOUND,
        }
    }
}

fn first_shift_slot(column: usize) -> &'static str {
    match column {
        0..=2 => "08:00 - 09:20, 1 пара",
        3..=4 => "09:30 - 10:50, 2 пара",
        5..=6 => "11:05 - 12:25, 3 пара",
        7..=8 => "12:55 - 14:15, 4 пара",
        _ => SLOT_NOT_FOUND,
    }
}

// The first band only matches column 2 exactly; column 1 belongs to the second band.
fn second_shift_slot(column: usize) -> &'static str {
    match column {
        2 => "12:55 - 14:15, 1 пара",
        0..=4 => "14:25 - 15:45, 2 пара",
        5..=6 => "16:00 - 17:20, 3 пара",
        7..=8 => "17:30 - 18:20, 4 пара",
        _ => SLOT_NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_number() {
        assert_eq!(Shift::from_number(0), None);
        assert_eq!(Shift::from_number(1), Some(Shift::First));
        assert_eq!(Shift::from_number(2), Some(Shift::Second));
        assert_eq!(Shift::from_number(3), Some(Shift::Unrecognized));
        assert_eq!(Shift::from_number(-1), Some(Shift::Unrecognized));
    }

    #[test]
    fn test_first_shift_bands() {
        assert_eq!(Shift::First.time_slot(1), "08:00 - 09:20, 1 пара");
        assert_eq!(Shift::First.time_slot(2), "08:00 - 09:20, 1 пара");
        assert_eq!(Shift::First.time_slot(3), "09:30 - 10:50, 2 пара");
        assert_eq!(Shift::First.time_slot(4), "09:30 - 10:50, 2 пара");
        assert_eq!(Shift::First.time_slot(6), "11:05 - 12:25, 3 пара");
        assert_eq!(Shift::First.time_slot(8), "12:55 - 14:15, 4 пара");
        assert_eq!(Shift::First.time_slot(9), SLOT_NOT_FOUND);
    }

    #[test]
    fn test_second_shift_bands() {
        assert_eq!(Shift::Second.time_slot(2), "12:55 - 14:15, 1 пара");
        assert_eq!(Shift::Second.time_slot(1), "14:25 - 15:45, 2 пара");
        assert_eq!(Shift::Second.time_slot(3), "14:25 - 15:45, 2 пара");
        assert_eq!(Shift::Second.time_slot(5), "16:00 - 17:20, 3 пара");
        assert_eq!(Shift::Second.time_slot(7), "17:30 - 18:20, 4 пара");
        assert_eq!(Shift::Second.time_slot(12), SLOT_NOT_FOUND);
    }

    #[test]
    fn test_unrecognized_shift_has_no_slots() {
        for column in 1..10 {
            assert_eq!(Shift::Unrecognized.time_slot(column), SLOT_NOT_FOUND);
        }
    }
}
