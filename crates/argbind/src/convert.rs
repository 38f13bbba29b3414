//! String-to-value conversion.
//!
//! Numeric and date/time parsing honor a [`ConversionOptions`] owned by the
//! parser. An exact date-time or duration format, once configured, is the only
//! format tried for that type.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::ConversionError;
use crate::value::{ScalarType, Value, ValueType};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_TIME_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Locale-dependent symbols used when reading numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub group_separator: char,
    pub currency_symbol: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            group_separator: ',',
            currency_symbol: "¤".to_string(),
        }
    }
}

/// Which decorations a numeric token may carry.
///
/// The default allows a leading sign and exponents. Group separators are
/// opt-in, so `1,2` is rejected rather than read as `12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberStyles {
    pub leading_sign: bool,
    /// Group separators in the integral part (`1,000`).
    pub thousands: bool,
    pub currency_symbol: bool,
    /// `(5)` reads as `-5`.
    pub parentheses: bool,
    /// Scientific notation for floats and decimals.
    pub exponent: bool,
}

impl NumberStyles {
    pub const NONE: Self = Self {
        leading_sign: false,
        thousands: false,
        currency_symbol: false,
        parentheses: false,
        exponent: false,
    };

    pub const INTEGER: Self = Self {
        leading_sign: true,
        ..Self::NONE
    };

    pub const ANY: Self = Self {
        leading_sign: true,
        thousands: true,
        currency_symbol: true,
        parentheses: true,
        exponent: true,
    };
}

impl Default for NumberStyles {
    fn default() -> Self {
        Self {
            leading_sign: true,
            exponent: true,
            ..Self::NONE
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    pub number_format: NumberFormat,
    pub number_styles: NumberStyles,
    /// Exact chrono format for [`ScalarType::DateTime`].
    pub date_time_format: Option<String>,
    /// Exact chrono format for [`ScalarType::DateTimeOffset`].
    pub date_time_offset_format: Option<String>,
    /// Exact duration pattern built from `%d %H %M %S %f` and literals.
    pub duration_format: Option<String>,
}

impl ConversionOptions {
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    pub fn with_number_styles(mut self, styles: NumberStyles) -> Self {
        self.number_styles = styles;
        self
    }

    pub fn with_date_time_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_format = Some(format.into());
        self
    }

    pub fn with_date_time_offset_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_offset_format = Some(format.into());
        self
    }

    pub fn with_duration_format(mut self, format: impl Into<String>) -> Self {
        self.duration_format = Some(format.into());
        self
    }
}

/// Converts tokens to [`Value`]s according to a [`ValueType`].
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConversionOptions,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert one token. A collection target yields a one-element collection.
    pub fn convert_one(&self, target: &ValueType, token: &str) -> Result<Value, ConversionError> {
        self.convert(target, &[token])
    }

    /// Convert a token list.
    ///
    /// Scalar targets require exactly one token; more is a contract
    /// violation. Collection targets convert every token into the element
    /// type and stop at the first failing element.
    pub fn convert<S: AsRef<str>>(
        &self,
        target: &ValueType,
        tokens: &[S],
    ) -> Result<Value, ConversionError> {
        match target.unwrapped() {
            ValueType::Scalar(ty) => match tokens {
                [token] => self.convert_scalar(*ty, token.as_ref()),
                _ => Err(ConversionError::SingleTokenExpected {
                    target: target.clone(),
                    count: tokens.len(),
                }),
            },
            ValueType::Collection { shape, element } => {
                let Some(element_ty) = scalar_element(element) else {
                    return Err(ConversionError::UnsupportedType(target.clone()));
                };
                let mut items = Vec::with_capacity(tokens.len());
                for (index, token) in tokens.iter().enumerate() {
                    let token = token.as_ref();
                    let item = self.convert_scalar(element_ty, token).map_err(|_| {
                        ConversionError::InvalidElement {
                            token: token.to_string(),
                            index,
                            target: ValueType::Scalar(element_ty),
                        }
                    })?;
                    items.push(item);
                }
                Ok(Value::collection(*shape, items))
            }
            ValueType::Nullable(_) => Err(ConversionError::UnsupportedType(target.clone())),
        }
    }

    /// Bring a programmatic value, such as a default or const, to `target`.
    ///
    /// Strings go through token conversion and integers move to any numeric
    /// kind they fit. A single value for a collection target becomes a
    /// one-element collection. Anything else must already have the target's
    /// kind.
    pub fn coerce(&self, target: &ValueType, value: Value) -> Result<Value, ConversionError> {
        match target.unwrapped() {
            ValueType::Scalar(ty) => self.coerce_scalar(*ty, value),
            ValueType::Collection { shape, element } => {
                let Some(element_ty) = scalar_element(element) else {
                    return Err(ConversionError::UnsupportedType(target.clone()));
                };
                let items = value
                    .into_items()
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let token = item.to_string();
                        self.coerce_scalar(element_ty, item)
                            .map_err(|_| ConversionError::InvalidElement {
                                token,
                                index,
                                target: ValueType::Scalar(element_ty),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::collection(*shape, items))
            }
            ValueType::Nullable(_) => Err(ConversionError::UnsupportedType(target.clone())),
        }
    }

    fn coerce_scalar(&self, ty: ScalarType, value: Value) -> Result<Value, ConversionError> {
        if value.scalar_type() == Some(ty) {
            return Ok(value);
        }
        if let Value::String(token) = &value {
            return self.convert_scalar(ty, token);
        }
        let coerced = match (ty, value.as_i64()) {
            (ty, Some(n)) if ty.is_integer() => Value::integer(ty, n),
            (ScalarType::F32, Some(n)) => Some(Value::F32(n as f32)),
            (ScalarType::F64, Some(n)) => Some(Value::F64(n as f64)),
            (ScalarType::Decimal, Some(n)) => Some(Value::Decimal(Decimal::from(n))),
            _ => None,
        };
        coerced.ok_or_else(|| ConversionError::InvalidValue {
            token: value.to_string(),
            target: ValueType::Scalar(ty),
        })
    }

    pub fn convert_scalar(&self, ty: ScalarType, token: &str) -> Result<Value, ConversionError> {
        let parsed = match ty {
            ScalarType::String => Some(Value::String(token.to_string())),
            ScalarType::Bool => parse_bool(token).map(Value::Bool),
            ScalarType::I16 => self.parse_number::<i16>(token).map(Value::I16),
            ScalarType::I32 => self.parse_number::<i32>(token).map(Value::I32),
            ScalarType::I64 => self.parse_number::<i64>(token).map(Value::I64),
            ScalarType::U16 => self.parse_number::<u16>(token).map(Value::U16),
            ScalarType::U32 => self.parse_number::<u32>(token).map(Value::U32),
            ScalarType::U64 => self.parse_number::<u64>(token).map(Value::U64),
            ScalarType::F32 => self.parse_number::<f32>(token).map(Value::F32),
            ScalarType::F64 => self.parse_number::<f64>(token).map(Value::F64),
            ScalarType::Decimal => self.parse_decimal(token).map(Value::Decimal),
            ScalarType::Uuid => Uuid::parse_str(token.trim()).ok().map(Value::Uuid),
            ScalarType::DateTime => self.parse_date_time(token).map(Value::DateTime),
            ScalarType::DateTimeOffset => self
                .parse_date_time_offset(token)
                .map(Value::DateTimeOffset),
            ScalarType::Duration => self.parse_duration(token).map(Value::Duration),
        };
        parsed.ok_or_else(|| ConversionError::InvalidValue {
            token: token.to_string(),
            target: ValueType::Scalar(ty),
        })
    }

    fn parse_number<T: FromStr>(&self, token: &str) -> Option<T> {
        self.normalize_number(token)?.parse().ok()
    }

    fn parse_decimal(&self, token: &str) -> Option<Decimal> {
        let normalized = self.normalize_number(token)?;
        if normalized.contains(['e', 'E']) {
            Decimal::from_scientific(&normalized).ok()
        } else {
            Decimal::from_str(&normalized).ok()
        }
    }

    /// Rewrite a localized numeric token into the form Rust's `FromStr`
    /// expects, rejecting decorations the configured styles do not allow.
    fn normalize_number(&self, token: &str) -> Option<String> {
        let format = &self.options.number_format;
        let styles = self.options.number_styles;

        let mut s = token.trim();
        let mut negative = false;

        if styles.parentheses && s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
            negative = true;
            s = s[1..s.len() - 1].trim();
        }
        if styles.currency_symbol {
            s = strip_currency(s, &format.currency_symbol);
        }
        if let Some(sign) = s.chars().next().filter(|c| *c == '-' || *c == '+') {
            if !styles.leading_sign || negative {
                return None;
            }
            negative = sign == '-';
            s = s[1..].trim_start();
            if styles.currency_symbol {
                s = strip_currency(s, &format.currency_symbol);
            }
        }
        if s.is_empty() || s.starts_with(['-', '+']) {
            return None;
        }

        let (integral, fraction) = match s.split_once(format.decimal_separator) {
            Some((integral, fraction)) => (integral, Some(fraction)),
            None => (s, None),
        };

        let mut out = String::with_capacity(s.len() + 1);
        if negative {
            out.push('-');
        }
        for ch in integral.chars() {
            if ch == format.group_separator {
                if !styles.thousands {
                    return None;
                }
                continue;
            }
            out.push(ch);
        }
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        if !styles.exponent && out.contains(['e', 'E']) {
            return None;
        }
        Some(out)
    }

    fn parse_date_time(&self, token: &str) -> Option<NaiveDateTime> {
        let token = token.trim();
        if let Some(format) = &self.options.date_time_format {
            return NaiveDateTime::parse_from_str(token, format)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(token, format)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                });
        }
        DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(token, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(token, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    fn parse_date_time_offset(&self, token: &str) -> Option<DateTime<FixedOffset>> {
        let token = token.trim();
        if let Some(format) = &self.options.date_time_offset_format {
            return DateTime::parse_from_str(token, format).ok();
        }
        DateTime::parse_from_rfc3339(token)
            .ok()
            .or_else(|| {
                DATE_TIME_OFFSET_FORMATS
                    .iter()
                    .find_map(|format| DateTime::parse_from_str(token, format).ok())
            })
            .or_else(|| DateTime::parse_from_rfc2822(token).ok())
    }

    fn parse_duration(&self, token: &str) -> Option<TimeDelta> {
        let token = token.trim();
        if let Some(format) = &self.options.duration_format {
            return parse_duration_exact(token, format);
        }
        let (negative, body) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let magnitude = parse_clock_duration(body)
            .or_else(|| body.parse::<i64>().ok().and_then(TimeDelta::try_days))
            .or_else(|| {
                humantime::parse_duration(body)
                    .ok()
                    .and_then(|d| TimeDelta::from_std(d).ok())
            })?;
        Some(if negative { -magnitude } else { magnitude })
    }
}

fn scalar_element(element: &ValueType) -> Option<ScalarType> {
    match element.unwrapped() {
        ValueType::Scalar(ty) => Some(*ty),
        _ => None,
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    let token = token.trim();
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn strip_currency<'a>(s: &'a str, symbol: &str) -> &'a str {
    if symbol.is_empty() {
        return s;
    }
    if let Some(rest) = s.strip_prefix(symbol) {
        rest.trim_start()
    } else if let Some(rest) = s.strip_suffix(symbol) {
        rest.trim_end()
    } else {
        s
    }
}

/// `[d.]hh:mm[:ss[.fraction]]`
fn parse_clock_duration(s: &str) -> Option<TimeDelta> {
    let parts: Vec<&str> = s.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }

    let (days, hours) = match parts[0].split_once('.') {
        Some((days, hours)) => (parse_digits(days)?, parse_digits(hours)?),
        None => (0, parse_digits(parts[0])?),
    };
    let minutes = parse_digits(parts[1])?;
    let (seconds, nanos) = match parts.get(2) {
        Some(sec) => match sec.split_once('.') {
            Some((whole, fraction)) => (parse_digits(whole)?, parse_fraction(fraction)?),
            None => (parse_digits(sec)?, 0),
        },
        None => (0, 0),
    };
    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }
    build_duration(days, hours, minutes, seconds, nanos)
}

/// Match `token` against a strict pattern of `%d`, `%H`, `%M`, `%S`, `%f`,
/// `%%` and literal characters.
fn parse_duration_exact(token: &str, pattern: &str) -> Option<TimeDelta> {
    let (mut days, mut hours, mut minutes, mut seconds, mut nanos) = (0, 0, 0, 0, 0);
    let mut rest = token;
    let mut pattern = pattern.chars();

    while let Some(ch) = pattern.next() {
        if ch != '%' {
            rest = rest.strip_prefix(ch)?;
            continue;
        }
        let field = pattern.next()?;
        if field == '%' {
            rest = rest.strip_prefix('%')?;
            continue;
        }
        let len = rest.chars().take_while(char::is_ascii_digit).count();
        if len == 0 {
            return None;
        }
        let (digits, tail) = rest.split_at(len);
        rest = tail;
        match field {
            'd' => days = parse_digits(digits)?,
            'H' => hours = parse_digits(digits)?,
            'M' => minutes = parse_digits(digits)?,
            'S' => seconds = parse_digits(digits)?,
            'f' => nanos = parse_fraction(digits)?,
            _ => return None,
        }
    }
    if !rest.is_empty() {
        return None;
    }
    build_duration(days, hours, minutes, seconds, nanos)
}

fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Fractional seconds as nanoseconds; at most nine digits.
fn parse_fraction(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 9 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{s:0<9}");
    padded.parse().ok()
}

fn build_duration(days: i64, hours: i64, minutes: i64, seconds: i64, nanos: u32) -> Option<TimeDelta> {
    let total = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    TimeDelta::new(total, nanos)
}
