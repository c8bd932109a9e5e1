//! Fixed-width text layout for a character display
//!
//! Both lines are always exactly `width` cells, blank-padded. Content that
//! does not fit is rejected with [`LayoutOverflowError`] rather than
//! truncated, so a line never spills into a neighbouring cell.
//!
//! The two lines centre differently:
//! - date: the whole token is centred, any odd cell goes to the right
//! - time: three cells are reserved for `" AM"`/`" PM"` when computing the
//!   left pad, then the meridiem is appended after a single space

use core::fmt::{self, Write};

use heapless::String;

use crate::error::LayoutOverflowError;
use crate::time::CivilDateTime;

/// Widest supported line (HD44780 controllers address at most 40 cells)
pub const MAX_DISPLAY_WIDTH: usize = 40;

/// Width of the reference 16x2 display
pub const DEFAULT_DISPLAY_WIDTH: usize = 16;

/// Separator space plus two-letter meridiem
const MERIDIEM_CELLS: usize = 3;

/// One fully padded display line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine(String<MAX_DISPLAY_WIDTH>);

impl DisplayLine {
    /// A line of `width` blank cells
    pub fn blank(width: usize) -> Result<Self, LayoutOverflowError> {
        LineBuilder::new(width)?.finish()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Number of cells, always the width it was laid out for
    pub fn width(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for DisplayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DisplayLine {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

/// AM/PM half of a 12-hour clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub const fn as_str(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

/// Convert a 0-23 hour to 12-hour form: 0 -> 12 AM, 12 -> 12 PM, 13 -> 1 PM
pub fn to_12_hour(hour: u8) -> (u8, Meridiem) {
    let meridiem = if hour < 12 { Meridiem::Am } else { Meridiem::Pm };
    let h = match hour % 12 {
        0 => 12,
        h => h,
    };
    (h, meridiem)
}

/// English ordinal suffix for a day of month
pub fn day_suffix(day: u8) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// `"<Weekday> <Day><Suffix> <Month>"` centred in `width` cells
///
/// Left padding is `(width - len) / 2`; the remainder goes to the right.
pub fn format_date_line(
    local: &CivilDateTime,
    width: usize,
) -> Result<DisplayLine, LayoutOverflowError> {
    let mut token: String<MAX_DISPLAY_WIDTH> = String::new();
    write!(
        token,
        "{} {}{} {}",
        local.weekday.abbrev(),
        local.day,
        day_suffix(local.day),
        local.month.abbrev()
    )
    .map_err(|_| overflow(MAX_DISPLAY_WIDTH + 1, width))?;

    let mut line = LineBuilder::new(width)?;
    let len = token.len();
    if len > width {
        return Err(overflow(len, width));
    }
    line.pad((width - len) / 2)?;
    line.push(&token)?;
    line.finish()
}

/// `"<H>:<MM>:<SS> <AM|PM>"` laid out in `width` cells
///
/// The left pad is `(width - len - 3) / 2`, where `len` is the time token
/// alone and 3 cells are reserved for the space and meridiem.
pub fn format_time_line(
    local: &CivilDateTime,
    width: usize,
) -> Result<DisplayLine, LayoutOverflowError> {
    let (hour, meridiem) = to_12_hour(local.hour);

    let mut token: String<MAX_DISPLAY_WIDTH> = String::new();
    write!(token, "{}:{:02}:{:02}", hour, local.minute, local.second)
        .map_err(|_| overflow(MAX_DISPLAY_WIDTH + 1, width))?;

    let mut line = LineBuilder::new(width)?;
    let required = token.len() + MERIDIEM_CELLS;
    if required > width {
        return Err(overflow(required, width));
    }
    line.pad((width - required) / 2)?;
    line.push(&token)?;
    line.push(" ")?;
    line.push(meridiem.as_str())?;
    line.finish()
}

fn overflow(required: usize, width: usize) -> LayoutOverflowError {
    LayoutOverflowError { required, width }
}

/// Bounds-checked cell writer for one line
struct LineBuilder {
    buf: String<MAX_DISPLAY_WIDTH>,
    width: usize,
}

impl LineBuilder {
    fn new(width: usize) -> Result<Self, LayoutOverflowError> {
        if width > MAX_DISPLAY_WIDTH {
            return Err(overflow(width, MAX_DISPLAY_WIDTH));
        }
        Ok(Self {
            buf: String::new(),
            width,
        })
    }

    fn push(&mut self, s: &str) -> Result<(), LayoutOverflowError> {
        let required = self.buf.len() + s.len();
        if required > self.width {
            return Err(overflow(required, self.width));
        }
        self.buf
            .push_str(s)
            .map_err(|_| overflow(required, self.width))
    }

    fn pad(&mut self, cells: usize) -> Result<(), LayoutOverflowError> {
        for _ in 0..cells {
            self.push(" ")?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<DisplayLine, LayoutOverflowError> {
        let remaining = self.width - self.buf.len();
        self.pad(remaining)?;
        Ok(DisplayLine(self.buf))
    }
}
