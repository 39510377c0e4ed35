use std::fmt;

/// A flag value as it appeared on the command line
///
/// Values are kept as strings and coerced on read, so the same stored
/// value can answer a boolean, string or integer lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Flag given without `=` (e.g. `-daemon`)
    Bare,
    /// Flag given as `-name=value`; the text may be empty
    Given(String),
}

impl ArgValue {
    /// Returns true if the flag carried no `=value` part
    pub fn is_bare(&self) -> bool {
        matches!(self, ArgValue::Bare)
    }

    /// The stored text; a bare flag reads as the empty string
    pub fn as_str(&self) -> &str {
        match self {
            ArgValue::Bare => "",
            ArgValue::Given(s) => s,
        }
    }

    /// Only a literal `0` reads as false
    pub fn as_bool(&self) -> bool {
        self.as_str() != "0"
    }

    /// Leading base-10 integer of the stored text, or 0 if there is none
    pub fn as_int(&self) -> i64 {
        parse_leading_int(self.as_str())
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Given(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Given(s)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Given(if b { "1" } else { "0" }.to_string())
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        ArgValue::Given(n.to_string())
    }
}

/// Parse an optional sign followed by digits, stopping at the first
/// non-digit. Saturates at the bounds of `i64`.
fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut n: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        n = if negative {
            n.saturating_mul(10).saturating_sub(d)
        } else {
            n.saturating_mul(10).saturating_add(d)
        };
    }
    n
}
