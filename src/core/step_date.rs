use chrono::{
    Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc,
};
use serde::{Deserialize, Serialize};

use crate::core::Timestamp;
use crate::core::primitives::{
    MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_MONTH, MILLIS_PER_SECOND,
    MILLIS_PER_YEAR, datetime_to_millis,
};
use crate::error::{TimelineError, TimelineResult};

/// Calendar unit of an axis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScaleUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl ScaleUnit {
    /// Nominal length of one unit; months count 30 days and years 12 months.
    #[must_use]
    pub const fn nominal_millis(self) -> i64 {
        match self {
            Self::Millisecond => 1,
            Self::Second => MILLIS_PER_SECOND,
            Self::Minute => MILLIS_PER_MINUTE,
            Self::Hour => MILLIS_PER_HOUR,
            Self::Day => MILLIS_PER_DAY,
            Self::Month => MILLIS_PER_MONTH,
            Self::Year => MILLIS_PER_YEAR,
        }
    }
}

/// One rung of the step ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub scale: ScaleUnit,
    pub step: u32,
}

impl StepSpec {
    #[must_use]
    pub const fn new(scale: ScaleUnit, step: u32) -> Self {
        Self { scale, step }
    }

    #[must_use]
    pub const fn nominal_millis(self) -> i64 {
        self.scale.nominal_millis() * self.step as i64
    }
}

/// Candidate steps ordered by ascending nominal duration.
pub const STEP_LADDER: [StepSpec; 28] = [
    StepSpec::new(ScaleUnit::Millisecond, 1),
    StepSpec::new(ScaleUnit::Millisecond, 5),
    StepSpec::new(ScaleUnit::Millisecond, 10),
    StepSpec::new(ScaleUnit::Millisecond, 50),
    StepSpec::new(ScaleUnit::Millisecond, 100),
    StepSpec::new(ScaleUnit::Millisecond, 200),
    StepSpec::new(ScaleUnit::Second, 1),
    StepSpec::new(ScaleUnit::Second, 5),
    StepSpec::new(ScaleUnit::Second, 10),
    StepSpec::new(ScaleUnit::Second, 15),
    StepSpec::new(ScaleUnit::Minute, 1),
    StepSpec::new(ScaleUnit::Minute, 5),
    StepSpec::new(ScaleUnit::Minute, 10),
    StepSpec::new(ScaleUnit::Minute, 15),
    StepSpec::new(ScaleUnit::Hour, 1),
    StepSpec::new(ScaleUnit::Hour, 4),
    StepSpec::new(ScaleUnit::Day, 1),
    StepSpec::new(ScaleUnit::Day, 2),
    StepSpec::new(ScaleUnit::Day, 5),
    StepSpec::new(ScaleUnit::Month, 1),
    StepSpec::new(ScaleUnit::Month, 3),
    StepSpec::new(ScaleUnit::Year, 1),
    StepSpec::new(ScaleUnit::Year, 5),
    StepSpec::new(ScaleUnit::Year, 10),
    StepSpec::new(ScaleUnit::Year, 50),
    StepSpec::new(ScaleUnit::Year, 100),
    StepSpec::new(ScaleUnit::Year, 500),
    StepSpec::new(ScaleUnit::Year, 1000),
];

/// Picks the smallest ladder step whose nominal duration exceeds `minimum_step_ms`.
///
/// Falls back to the coarsest step when nothing on the ladder is large enough.
#[must_use]
pub fn select_step(minimum_step_ms: f64) -> StepSpec {
    STEP_LADDER
        .iter()
        .copied()
        .find(|spec| spec.nominal_millis() as f64 > minimum_step_ms)
        .unwrap_or(STEP_LADDER[STEP_LADDER.len() - 1])
}

/// Calendar-aware iterator over axis ticks in `[start, end]`.
///
/// Calendar fields are read in a fixed UTC offset so output does not depend
/// on the host timezone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDate {
    start: NaiveDateTime,
    end: NaiveDateTime,
    current: NaiveDateTime,
    spec: StepSpec,
    auto_scale: bool,
    offset: FixedOffset,
}

impl StepDate {
    pub fn new(
        start: Timestamp,
        end: Timestamp,
        minimum_step_ms: f64,
        offset: FixedOffset,
    ) -> TimelineResult<Self> {
        let mut step_date = Self {
            start: to_local(start, offset),
            end: to_local(start, offset),
            current: to_local(start, offset),
            spec: StepSpec::new(ScaleUnit::Day, 1),
            auto_scale: true,
            offset,
        };
        step_date.set_range(start, end, minimum_step_ms)?;
        Ok(step_date)
    }

    /// Reconfigures the range; re-selects the step unless a scale is pinned.
    pub fn set_range(
        &mut self,
        start: Timestamp,
        end: Timestamp,
        minimum_step_ms: f64,
    ) -> TimelineResult<()> {
        let start_ms = datetime_to_millis(start);
        let end_ms = datetime_to_millis(end);
        if end_ms < start_ms {
            return Err(TimelineError::InvalidRange {
                start: start_ms as f64,
                end: end_ms as f64,
            });
        }
        if !minimum_step_ms.is_finite() || minimum_step_ms < 0.0 {
            return Err(TimelineError::InvalidData(
                "minimum step must be finite and >= 0".to_owned(),
            ));
        }

        self.start = to_local(start, self.offset);
        self.end = to_local(end, self.offset);
        self.current = self.start;
        if self.auto_scale {
            self.spec = select_step(minimum_step_ms);
        }
        Ok(())
    }

    /// Pins the scale; later range updates keep it until `set_auto_scale`.
    pub fn set_scale(&mut self, scale: ScaleUnit, step: u32) -> TimelineResult<()> {
        if step == 0 {
            return Err(TimelineError::InvalidData(
                "step size must be > 0".to_owned(),
            ));
        }
        self.spec = StepSpec::new(scale, step);
        self.auto_scale = false;
        Ok(())
    }

    pub fn set_auto_scale(&mut self, enabled: bool) {
        self.auto_scale = enabled;
    }

    #[must_use]
    pub fn is_auto_scale(&self) -> bool {
        self.auto_scale
    }

    #[must_use]
    pub fn scale(&self) -> ScaleUnit {
        self.spec.scale
    }

    #[must_use]
    pub fn step(&self) -> u32 {
        self.spec.step
    }

    #[must_use]
    pub fn spec(&self) -> StepSpec {
        self.spec
    }

    #[must_use]
    pub fn current(&self) -> Timestamp {
        to_utc(self.current, self.offset)
    }

    /// Moves the cursor to the range start, rounded down to a step boundary.
    pub fn start(&mut self) {
        self.current = round_down(self.start, self.spec).unwrap_or(self.start);
    }

    /// Advances the cursor by one step.
    pub fn next(&mut self) {
        let previous = self.current;
        match advance(previous, self.spec) {
            Some(next) if next > previous => self.current = next,
            _ if previous < self.end => self.current = self.end,
            _ => {
                self.current = self
                    .end
                    .checked_add_signed(TimeDelta::milliseconds(1))
                    .unwrap_or(self.end);
            }
        }
    }

    #[must_use]
    pub fn done(&self) -> bool {
        self.current > self.end
    }

    /// True when the cursor sits on a boundary of the next coarser unit.
    #[must_use]
    pub fn is_major(&self) -> bool {
        let current = self.current;
        match self.spec.scale {
            ScaleUnit::Millisecond => millis_of(current) == 0,
            ScaleUnit::Second => current.second() == 0,
            ScaleUnit::Minute => current.hour() == 0 && current.minute() == 0,
            ScaleUnit::Hour => current.hour() == 0,
            ScaleUnit::Day => current.day() == 1,
            ScaleUnit::Month => current.month0() == 0,
            ScaleUnit::Year => false,
        }
    }

    #[must_use]
    pub fn minor_label(&self) -> String {
        let current = self.current;
        match self.spec.scale {
            ScaleUnit::Millisecond => millis_of(current).to_string(),
            ScaleUnit::Second => current.second().to_string(),
            ScaleUnit::Minute | ScaleUnit::Hour => current.format("%H:%M").to_string(),
            ScaleUnit::Day => current.day().to_string(),
            ScaleUnit::Month => current.format("%b").to_string(),
            ScaleUnit::Year => current.year().to_string(),
        }
    }

    #[must_use]
    pub fn major_label(&self) -> String {
        let current = self.current;
        match self.spec.scale {
            ScaleUnit::Millisecond => current.format("%H:%M:%S").to_string(),
            ScaleUnit::Second => current.format("%-d %B %H:%M").to_string(),
            ScaleUnit::Minute => current.format("%A %-d %B %Y").to_string(),
            ScaleUnit::Hour => current.format("%-d %B %Y").to_string(),
            ScaleUnit::Day => current.format("%B %Y").to_string(),
            ScaleUnit::Month => current.year().to_string(),
            ScaleUnit::Year => String::new(),
        }
    }

    /// Rounds `time` to the nearest tick of the current scale and step.
    ///
    /// Ties resolve to the later tick.
    #[must_use]
    pub fn snap(&self, time: Timestamp) -> Timestamp {
        let local = to_local(time, self.offset);
        let Some(floor) = round_down(local, self.spec) else {
            return time;
        };
        let Some(ceil) = advance(floor, self.spec) else {
            return to_utc(floor, self.offset);
        };
        let snapped = if ceil - local <= local - floor {
            ceil
        } else {
            floor
        };
        to_utc(snapped, self.offset)
    }
}

fn to_local(time: Timestamp, offset: FixedOffset) -> NaiveDateTime {
    time.with_timezone(&offset).naive_local()
}

fn to_utc(local: NaiveDateTime, offset: FixedOffset) -> Timestamp {
    let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    let naive = local.checked_sub_signed(shift).unwrap_or(local);
    Utc.from_utc_datetime(&naive)
}

fn millis_of(time: NaiveDateTime) -> u32 {
    time.nanosecond() / 1_000_000 % 1_000
}

/// Calendar fields with a zero-based month, mirroring how the axis rounds.
#[derive(Debug, Clone, Copy)]
struct Fields {
    year: i32,
    month0: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    milli: u32,
}

impl Fields {
    fn of(time: NaiveDateTime) -> Self {
        Self {
            year: time.year(),
            month0: time.month0(),
            day: time.day(),
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
            milli: millis_of(time),
        }
    }

    fn compose(self) -> Option<NaiveDateTime> {
        let day = self.day.min(days_in_month(self.year, self.month0 + 1)?);
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, day)?.and_hms_milli_opt(
            self.hour,
            self.minute,
            self.second,
            self.milli,
        )
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

fn round_down(time: NaiveDateTime, spec: StepSpec) -> Option<NaiveDateTime> {
    let mut fields = Fields::of(time);
    let step = spec.step.max(1);

    if spec.scale >= ScaleUnit::Year {
        fields.month0 = 0;
    }
    if spec.scale >= ScaleUnit::Month {
        fields.day = 1;
    }
    if spec.scale >= ScaleUnit::Day {
        fields.hour = 0;
    }
    if spec.scale >= ScaleUnit::Hour {
        fields.minute = 0;
    }
    if spec.scale >= ScaleUnit::Minute {
        fields.second = 0;
    }
    if spec.scale >= ScaleUnit::Second {
        fields.milli = 0;
    }

    if step != 1 {
        match spec.scale {
            ScaleUnit::Millisecond => fields.milli -= fields.milli % step,
            ScaleUnit::Second => fields.second -= fields.second % step,
            ScaleUnit::Minute => fields.minute -= fields.minute % step,
            ScaleUnit::Hour => fields.hour -= fields.hour % step,
            ScaleUnit::Day => fields.day = (fields.day - 1) - (fields.day - 1) % step + 1,
            ScaleUnit::Month => fields.month0 -= fields.month0 % step,
            ScaleUnit::Year => {
                let step = i32::try_from(step).ok()?;
                fields.year -= fields.year.rem_euclid(step);
            }
        }
    }

    fields.compose()
}

fn advance(time: NaiveDateTime, spec: StepSpec) -> Option<NaiveDateTime> {
    let step = spec.step.max(1);
    let advanced = match spec.scale {
        ScaleUnit::Millisecond => time.checked_add_signed(TimeDelta::milliseconds(i64::from(step)))?,
        ScaleUnit::Second => time.checked_add_signed(TimeDelta::seconds(i64::from(step)))?,
        ScaleUnit::Minute => time.checked_add_signed(TimeDelta::minutes(i64::from(step)))?,
        ScaleUnit::Hour => {
            let advanced = time.checked_add_signed(TimeDelta::hours(i64::from(step)))?;
            let hour = advanced.hour();
            advanced.with_hour(hour - hour % step)?
        }
        ScaleUnit::Day => time.checked_add_signed(TimeDelta::days(i64::from(step)))?,
        ScaleUnit::Month => {
            let mut fields = Fields::of(time);
            let total = i64::from(fields.year) * 12 + i64::from(fields.month0) + i64::from(step);
            fields.year = i32::try_from(total.div_euclid(12)).ok()?;
            fields.month0 = u32::try_from(total.rem_euclid(12)).ok()?;
            fields.compose()?
        }
        ScaleUnit::Year => {
            let mut fields = Fields::of(time);
            fields.year = fields.year.checked_add(i32::try_from(step).ok()?)?;
            fields.compose()?
        }
    };

    if step == 1 {
        return Some(advanced);
    }

    let mut fields = Fields::of(advanced);
    match spec.scale {
        ScaleUnit::Millisecond if fields.milli < step => fields.milli = 0,
        ScaleUnit::Second if fields.second < step => fields.second = 0,
        ScaleUnit::Minute if fields.minute < step => fields.minute = 0,
        ScaleUnit::Hour if fields.hour < step => fields.hour = 0,
        ScaleUnit::Day if fields.day < step + 1 => fields.day = 1,
        ScaleUnit::Month if fields.month0 < step => fields.month0 = 0,
        _ => return Some(advanced),
    }
    fields.compose()
}
