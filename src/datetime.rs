//! Excel serial date conversion.
//!
//! Serials count days since 1899-12-30 in the 1900 system, including Excel's
//! phantom Feb 29, 1900 (serial 60). The 1904 system is normalized away at
//! parse time by adding the 1462-day offset, so everything downstream works
//! in the 1900 system.

/// Offset between the 1904 and 1900 date systems, in days.
pub(crate) const DATE1904_OFFSET: f64 = 1462.0;

/// Calendar components of a serial date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateComponents {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl DateComponents {
    pub(crate) fn has_time(&self) -> bool {
        self.hour != 0 || self.minute != 0 || self.second != 0
    }
}

/// Convert an Excel serial date (1900 system) to calendar components.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn serial_to_components(serial: f64) -> DateComponents {
    let days = serial.floor() as i32;
    let time_frac = serial.fract().abs();

    // Serial 1 = Jan 1, 1900 = JDN 2415021. Days past the phantom Feb 29
    // (serial 60) need one day subtracted.
    let jdn = if days <= 60 {
        days + 2_415_020
    } else {
        days + 2_415_019
    };

    let (year, month, day) = jdn_to_ymd(jdn);

    let total_seconds = (time_frac * 86400.0).round() as u32;
    let hour = total_seconds / 3600;
    let minute = (total_seconds % 3600) / 60;
    let second = total_seconds % 60;

    DateComponents {
        year,
        month,
        day,
        hour,
        minute,
        second,
    }
}

/// Convert calendar components to an Excel serial date (1900 system).
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn components_to_serial(c: DateComponents) -> f64 {
    let jdn = ymd_to_jdn(c.year, c.month, c.day);

    // Inverse of the phantom-day split in serial_to_components. The boundary
    // JDN 2415080 corresponds to serial 60 (the fake Feb 29, 1900).
    let days = if jdn <= 2_415_080 {
        jdn - 2_415_020
    } else {
        jdn - 2_415_019
    };

    let seconds = i64::from(c.hour) * 3600 + i64::from(c.minute) * 60 + i64::from(c.second);
    days as f64 + seconds as f64 / 86400.0
}

/// Convert Julian Day Number to (year, month, day) in the proleptic Gregorian calendar.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jdn_to_ymd(jdn: i32) -> (i32, u32, u32) {
    let y = 4716;
    let j = 1401;
    let m = 2;
    let n = 12;
    let r = 4;
    let p = 1461;
    let v = 3;
    let u = 5;
    let s = 153;
    let w = 2;
    let b = 274_277;
    let c = -38;

    let jdn_i64 = i64::from(jdn);

    let f = jdn_i64 + j + (((4 * jdn_i64 + b) / 146_097) * 3) / 4 + c;
    let e = r * f + v;
    let g = (e % p) / r;
    let h = u * g + w;

    let day = (h % s) / u + 1;
    let month = ((h / s + m) % n) + 1;
    let year = (e / p) - y + (n + m - month) / n;

    (year as i32, month as u32, day as u32)
}

/// Convert (year, month, day) in the proleptic Gregorian calendar to a Julian Day Number.
#[allow(clippy::cast_possible_truncation)]
fn ymd_to_jdn(year: i32, month: u32, day: u32) -> i64 {
    let a = i64::from(14 - month as i32) / 12;
    let y = i64::from(year) + 4800 - a;
    let m = i64::from(month) + 12 * a - 3;

    i64::from(day) + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
}
