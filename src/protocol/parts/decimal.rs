//! Exact decimal values.
//!
//! The wire transports a decimal as its declared (precision, scale), the
//! digit counts of the integer and fractional parts, a sign flag, and a
//! sequence of 32-bit digit groups in base 10^9. Integer-part groups are
//! left-aligned (the first group carries the short remainder), fractional
//! groups are right-padded with zeros so every group holds exactly nine
//! digits.

use crate::protocol::io_stream::{InputStream, OutputStream};
use crate::{DqError, DqResult};
use bigdecimal::BigDecimal;
use std::str::FromStr;

const DIGITS_PER_GROUP: usize = 9;
const GROUP_BASE: u32 = 1_000_000_000;

/// An exact decimal number, kept in its literal form.
///
/// The accepted literal grammar is `[+-]?(0|[1-9][0-9]*)(\.[0-9]+)?`:
/// no leading zeros, no bare `.5`, no trailing period, no exponent.
#[derive(Clone, Debug)]
pub struct Decimal {
    literal: String,
    precision: i32,
    scale: i32,
}

impl Decimal {
    /// Creates a decimal from a literal.
    ///
    /// # Errors
    ///
    /// `DqError::Usage*` if the literal does not match the grammar.
    pub fn new(literal: &str) -> DqResult<Self> {
        validate_literal(literal)?;
        let (precision, scale) = shape_of(literal);
        Ok(Self {
            literal: literal.to_string(),
            precision,
            scale,
        })
    }

    pub fn zero() -> Self {
        Self {
            literal: "0".to_string(),
            precision: 1,
            scale: 0,
        }
    }

    /// The literal form, e.g. `-123.45`.
    pub fn as_str(&self) -> &str {
        &self.literal
    }

    /// Total number of significant decimal digits.
    pub fn precision(&self) -> i32 {
        self.precision
    }

    /// Number of digits right of the decimal point.
    pub fn scale(&self) -> i32 {
        self.scale
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn emit<W: std::io::Write>(&self, stream: &mut OutputStream<W>) -> DqResult<()> {
        let negative = self.literal.starts_with('-');
        let unsigned = self.literal.trim_start_matches(['+', '-']);
        let (int_str, frac_str) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };

        let mut groups: Vec<u32> = Vec::new();

        // integer part: left-pad to a multiple of nine, so the first
        // group carries the short remainder
        let int_group_count = int_str.len().div_ceil(DIGITS_PER_GROUP);
        let padded_len = int_group_count * DIGITS_PER_GROUP;
        let mut padded = String::with_capacity(padded_len);
        for _ in int_str.len()..padded_len {
            padded.push('0');
        }
        padded.push_str(int_str);
        for chunk in 0..int_group_count {
            let s = &padded[chunk * DIGITS_PER_GROUP..(chunk + 1) * DIGITS_PER_GROUP];
            groups.push(parse_group(s)?);
        }

        // fractional part: right-pad to a multiple of nine
        let frac_group_count = frac_str.len().div_ceil(DIGITS_PER_GROUP);
        let mut padded = String::with_capacity(frac_group_count * DIGITS_PER_GROUP);
        padded.push_str(frac_str);
        for _ in frac_str.len()..frac_group_count * DIGITS_PER_GROUP {
            padded.push('0');
        }
        for chunk in 0..frac_group_count {
            let s = &padded[chunk * DIGITS_PER_GROUP..(chunk + 1) * DIGITS_PER_GROUP];
            groups.push(parse_group(s)?);
        }

        stream.write_i32(self.precision)?;
        stream.write_i32(self.scale)?;
        stream.write_i32(int_str.len() as i32)?;
        stream.write_i32(frac_str.len() as i32)?;
        stream.write_bytes(&[u8::from(negative)])?;
        stream.write_i32(groups.len() as i32)?;
        for group in groups {
            stream.write_i32(group as i32)?;
        }
        Ok(())
    }

    #[allow(clippy::cast_sign_loss)]
    pub(crate) fn parse<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<Self> {
        let precision = stream.read_i32()?;
        let scale = stream.read_i32()?;
        let integer_len = stream.read_i32()?;
        let fraction_len = stream.read_i32()?;
        let negative = stream.read_bytes(1)?[0] != 0;
        let group_count = stream.read_i32()?;
        if integer_len < 0 || fraction_len < 0 || group_count < 0 {
            return Err(DqError::Interface("negative length in decimal payload"));
        }
        let mut groups = Vec::with_capacity(group_count as usize);
        for _ in 0..group_count {
            groups.push(stream.read_i32()?);
        }

        let int_group_count = (integer_len as usize).div_ceil(DIGITS_PER_GROUP);
        let frac_group_count = (fraction_len as usize).div_ceil(DIGITS_PER_GROUP);
        if groups.len() < int_group_count + frac_group_count {
            return Err(DqError::Interface("too few digit groups in decimal payload"));
        }

        let mut literal = String::new();
        if negative {
            literal.push('-');
        }

        let mut int_str = String::new();
        for (i, group) in groups[..int_group_count].iter().enumerate() {
            if i == 0 {
                if *group > 0 {
                    int_str.push_str(&group.to_string());
                }
            } else {
                int_str.push_str(&format!("{group:09}"));
            }
        }
        if int_str.is_empty() {
            int_str.push('0');
        }
        literal.push_str(&int_str);

        if fraction_len > 0 {
            let mut frac_str = String::new();
            for group in &groups[int_group_count..int_group_count + frac_group_count] {
                frac_str.push_str(&format!("{group:09}"));
            }
            frac_str.truncate(fraction_len as usize);
            literal.push('.');
            literal.push_str(&frac_str);
        }

        Ok(Self {
            literal,
            precision,
            scale,
        })
    }
}

fn parse_group(s: &str) -> DqResult<u32> {
    let group: u32 = s
        .parse()
        .map_err(|_| DqError::Unexpected("digit group is not numeric"))?;
    if group >= GROUP_BASE {
        return Err(DqError::Unexpected("digit group exceeds nine digits"));
    }
    Ok(group)
}

// literal grammar: [+-]? (0 | [1-9][0-9]*) (\.[0-9]+)?
fn validate_literal(literal: &str) -> DqResult<()> {
    let bad = || DqError::UsageDetailed(format!("{literal} is not a valid decimal literal"));
    let unsigned = literal.strip_prefix(['+', '-']).unwrap_or(literal);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    if int_part.len() > 1 && int_part.starts_with('0') {
        return Err(bad());
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn shape_of(literal: &str) -> (i32, i32) {
    let unsigned = literal.trim_start_matches(['+', '-']);
    match unsigned.split_once('.') {
        Some((int_part, frac_part)) => {
            let mut precision = int_part.len() + frac_part.len();
            // a zero integer part does not count towards the precision
            if int_part == "0" {
                precision -= 1;
            }
            (precision as i32, frac_part.len() as i32)
        }
        None => (unsigned.len() as i32, 0),
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        match (
            BigDecimal::from_str(&self.literal),
            BigDecimal::from_str(&other.literal),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.literal == other.literal,
        }
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.literal)
    }
}

impl std::str::FromStr for Decimal {
    type Err = DqError;

    fn from_str(s: &str) -> DqResult<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::Decimal;
    use crate::protocol::io_stream::{InputStream, OutputStream};

    fn roundtrip(d: &Decimal) -> Decimal {
        let mut buf = Vec::new();
        d.emit(&mut OutputStream::new(&mut buf)).unwrap();
        Decimal::parse(&mut InputStream::new(std::io::Cursor::new(buf))).unwrap()
    }

    #[test]
    fn accepts_well_formed_literals() {
        for literal in ["0", "+100", "-0.12", "1.2000", "12345", "123.45", "0.12345"] {
            assert!(Decimal::new(literal).is_ok(), "{literal}");
        }
    }

    #[test]
    fn rejects_malformed_literals() {
        for literal in ["000.2", "0010", ".12", "12.", "1e3", "12+1", "", "+", "1.2.3"] {
            assert!(Decimal::new(literal).is_err(), "{literal}");
        }
    }

    #[test]
    fn shape_is_derived_from_the_literal() {
        let d = Decimal::new("123.45").unwrap();
        assert_eq!((d.precision(), d.scale()), (5, 2));
        let d = Decimal::new("0.12").unwrap();
        assert_eq!((d.precision(), d.scale()), (2, 2));
        let d = Decimal::new("12345").unwrap();
        assert_eq!((d.precision(), d.scale()), (5, 0));
    }

    #[test]
    fn wire_roundtrip_preserves_the_literal() {
        for literal in [
            "0",
            "12345",
            "-12345",
            "123.45",
            "0.12345",
            "-0.000000001",
            "12345678901234567890.987654321987",
            "1.2000",
        ] {
            let d = Decimal::new(literal).unwrap();
            let back = roundtrip(&d);
            assert_eq!(back.as_str(), literal, "literal {literal}");
            assert_eq!(back, d);
            assert_eq!(back.precision(), d.precision());
            assert_eq!(back.scale(), d.scale());
        }
    }

    #[test]
    fn groups_are_base_billion() {
        let d = Decimal::new("123.45").unwrap();
        let mut buf = Vec::new();
        d.emit(&mut OutputStream::new(&mut buf)).unwrap();
        let mut input = InputStream::new(std::io::Cursor::new(buf));
        assert_eq!(input.read_i32().unwrap(), 5); // precision
        assert_eq!(input.read_i32().unwrap(), 2); // scale
        assert_eq!(input.read_i32().unwrap(), 3); // integer digits
        assert_eq!(input.read_i32().unwrap(), 2); // fractional digits
        assert_eq!(input.read_bytes(1).unwrap(), vec![0]); // sign
        assert_eq!(input.read_i32().unwrap(), 2); // group count
        assert_eq!(input.read_i32().unwrap(), 123);
        assert_eq!(input.read_i32().unwrap(), 450_000_000);
    }

    #[test]
    fn equality_is_numeric() {
        assert_eq!(Decimal::new("1.2000").unwrap(), Decimal::new("1.2").unwrap());
        assert_ne!(Decimal::new("1.2").unwrap(), Decimal::new("1.20001").unwrap());
    }
}
