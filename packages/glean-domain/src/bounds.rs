use time::{Duration, OffsetDateTime, Time, UtcOffset};

/// Fixed lower limits for day listings plus the offset that defines a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListBounds {
	pub feature_floor: OffsetDateTime,
	pub install_time: Option<OffsetDateTime>,
	pub day_offset: UtcOffset,
}
impl ListBounds {
	/// `max(start_date ?? feature_floor, install_time)`.
	pub fn hard_lower_limit(&self, start_date: Option<OffsetDateTime>) -> OffsetDateTime {
		let lower = start_date.unwrap_or(self.feature_floor);

		match self.install_time {
			Some(install_time) if install_time > lower => install_time,
			_ => lower,
		}
	}

	pub fn end_of_day(&self, at: OffsetDateTime) -> OffsetDateTime {
		start_of_day(at, self.day_offset) + Duration::DAY - Duration::MILLISECOND
	}
}

pub fn start_of_day(at: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
	at.to_offset(offset).replace_time(Time::MIDNIGHT)
}

/// Moves `cursor` back by `days` days, then to the start of that day, without passing
/// `hard_lower`.
///
/// Every window below a mid-day cursor therefore covers whole days. For `cursor > hard_lower`
/// and `days >= 1` the result is strictly earlier than `cursor`.
pub fn step_back(
	cursor: OffsetDateTime,
	hard_lower: OffsetDateTime,
	days: usize,
	offset: UtcOffset,
) -> OffsetDateTime {
	let days = i64::try_from(days).unwrap_or(i64::MAX);

	if (cursor - hard_lower).whole_days() < days {
		hard_lower
	} else {
		start_of_day(cursor - Duration::days(days), offset).max(hard_lower)
	}
}
