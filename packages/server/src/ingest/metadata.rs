use std::io::Cursor;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use exif::{In, Reader, Tag, Value};

/// An exposure time as it appears in EXIF data or client input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExposureValue {
    /// Plain number of seconds.
    Seconds(f64),
    /// Rational exposure such as `1/250`.
    Fraction { numerator: u32, denominator: u32 },
}

impl ExposureValue {
    /// Build from an EXIF rational. Exposures of one second or longer become [`Self::Seconds`].
    pub fn from_rational(numerator: u32, denominator: u32) -> Option<Self> {
        if denominator == 0 || numerator == 0 {
            return None;
        }
        if numerator >= denominator {
            Some(Self::Seconds(numerator as f64 / denominator as f64))
        } else {
            Some(Self::Fraction {
                numerator,
                denominator,
            })
        }
    }
}

/// `2` → `"2s"`, `0.5` → `"1/2s"`, `1/250` → `"1/250s"`. Unusable values give `""`.
pub fn format_exposure_time(value: ExposureValue) -> String {
    match value {
        ExposureValue::Seconds(n) if !n.is_finite() || n <= 0.0 => String::new(),
        ExposureValue::Seconds(n) if n >= 1.0 => format!("{n}s"),
        ExposureValue::Seconds(n) => {
            let denominator = (1.0 / n).round();
            format!("1/{denominator}s")
        }
        ExposureValue::Fraction {
            numerator,
            denominator,
        } if numerator > 0 && denominator > 0 => format!("{numerator}/{denominator}s"),
        ExposureValue::Fraction { .. } => String::new(),
    }
}

/// `2.8` → `"f/2.8"`, `4.0` → `"f/4"`.
pub fn format_aperture(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let fixed = format!("{value:.1}");
    let trimmed = fixed.strip_suffix(".0").unwrap_or(&fixed);
    format!("f/{trimmed}")
}

pub fn format_focal_length(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    format!("{value}mm")
}

/// Fields derived from a photo's EXIF block. Absent tags stay empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExifSummary {
    pub manufacturer: String,
    pub model: String,
    pub taken_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub exposure_time: String,
    pub aperture: String,
    pub iso: String,
    pub focal_length: String,
}

/// Read the primary-image EXIF tags from an encoded image.
pub fn extract(bytes: &[u8]) -> Result<ExifSummary, exif::Error> {
    let exif = Reader::new().read_from_container(&mut Cursor::new(bytes))?;
    let field = |tag: Tag| exif.get_field(tag, In::PRIMARY).map(|f| &f.value);

    Ok(ExifSummary {
        manufacturer: field(Tag::Make).and_then(ascii).unwrap_or_default(),
        model: field(Tag::Model).and_then(ascii).unwrap_or_default(),
        taken_at: field(Tag::DateTimeOriginal).and_then(datetime),
        modified_at: field(Tag::DateTime).and_then(datetime),
        exposure_time: field(Tag::ExposureTime)
            .and_then(first_rational)
            .and_then(|(n, d)| ExposureValue::from_rational(n, d))
            .map(format_exposure_time)
            .unwrap_or_default(),
        aperture: field(Tag::FNumber)
            .and_then(rational_f64)
            .map(format_aperture)
            .unwrap_or_default(),
        iso: field(Tag::PhotographicSensitivity)
            .and_then(|v| v.get_uint(0))
            .map(|iso| iso.to_string())
            .unwrap_or_default(),
        focal_length: field(Tag::FocalLength)
            .and_then(rational_f64)
            .map(format_focal_length)
            .unwrap_or_default(),
    })
}

fn ascii(value: &Value) -> Option<String> {
    let Value::Ascii(parts) = value else {
        return None;
    };
    let raw = parts.first()?;
    let text = String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string();
    (!text.is_empty()).then_some(text)
}

fn first_rational(value: &Value) -> Option<(u32, u32)> {
    match value {
        Value::Rational(r) => r.first().map(|r| (r.num, r.denom)),
        _ => None,
    }
}

fn rational_f64(value: &Value) -> Option<f64> {
    let (num, denom) = first_rational(value)?;
    (denom != 0).then(|| num as f64 / denom as f64)
}

/// EXIF timestamps carry no zone unless an offset is present; they are read as UTC.
fn datetime(value: &Value) -> Option<DateTime<Utc>> {
    let Value::Ascii(parts) = value else {
        return None;
    };
    let dt = exif::DateTime::from_ascii(parts.first()?).ok()?;
    let naive = NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?
        .and_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into())?;
    let utc = Utc.from_utc_datetime(&naive);
    match dt.offset {
        Some(minutes) => Some(utc - chrono::Duration::minutes(minutes.into())),
        None => Some(utc),
    }
}
