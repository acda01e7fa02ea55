//! Coordinate text parsing
//!
//! Two grammars, tried in order: decimal degrees ("lat, lon" or "lat lon"),
//! then a military grid reference handed to a [`GridConverter`]. The
//! projection math itself lives behind the trait.

use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::{char, digit0, multispace0, multispace1, satisfy},
    combinator::{map_res, value},
    number::complete::double,
    IResult, Parser,
};

/// A parsed grid reference, e.g. `4QFJ 12345 67890`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridReference {
    pub zone: u8,
    pub band: char,
    /// 100 km square letters (column, row)
    pub square: [char; 2],
    /// Meters within the 100 km square
    pub easting: u32,
    pub northing: u32,
    /// Digits per axis as written (0-5)
    pub precision: u8,
}

/// Converts a grid reference into latitude/longitude
pub trait GridConverter: Send + Sync {
    fn to_lat_lon(&self, grid: &GridReference) -> Option<(f64, f64)>;
}

/// Parse coordinate text into (latitude, longitude).
///
/// Returns None when neither grammar matches or the result is out of range.
/// Grid references are only tried when a converter is supplied.
pub fn parse_coordinates(
    text: &str,
    grid: Option<&dyn GridConverter>,
) -> Option<(f64, f64)> {
    if let Some(pair) = parse_decimal(text) {
        return Some(pair);
    }
    let converter = grid?;
    let reference = GridReference::parse(text)?;
    let (latitude, longitude) = converter.to_lat_lon(&reference)?;
    in_range(latitude, longitude)
}

/// Decimal-degree grammar only
pub fn parse_decimal(text: &str) -> Option<(f64, f64)> {
    match decimal_pair(text) {
        Ok(("", (latitude, longitude))) => in_range(latitude, longitude),
        _ => None,
    }
}

fn in_range(latitude: f64, longitude: f64) -> Option<(f64, f64)> {
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);
    valid.then_some((latitude, longitude))
}

fn separator(i: &str) -> IResult<&str, ()> {
    alt((
        value((), (multispace0, char(','), multispace0)),
        value((), multispace1),
    ))
    .parse(i)
}

fn decimal_pair(i: &str) -> IResult<&str, (f64, f64)> {
    let (i, _) = multispace0(i)?;
    let (i, latitude) = double(i)?;
    let (i, _) = separator(i)?;
    let (i, longitude) = double(i)?;
    let (i, _) = multispace0(i)?;
    Ok((i, (latitude, longitude)))
}

fn is_band_letter(c: char) -> bool {
    ('C'..='X').contains(&c) && c != 'I' && c != 'O'
}

fn is_square_letter(c: char) -> bool {
    c.is_ascii_uppercase() && c != 'I' && c != 'O'
}

fn grid_parts(i: &str) -> IResult<&str, (u8, char, char, char, &str)> {
    let (i, zone) = map_res(
        take_while_m_n(1, 2, |c: char| c.is_ascii_digit()),
        |z: &str| z.parse::<u8>(),
    )
    .parse(i)?;
    let (i, band) = satisfy(is_band_letter).parse(i)?;
    let (i, column) = satisfy(is_square_letter).parse(i)?;
    let (i, row) = satisfy(is_square_letter).parse(i)?;
    let (i, digits) = digit0(i)?;
    Ok((i, (zone, band, column, row, digits)))
}

impl GridReference {
    /// Parse a grid reference; whitespace is ignored and letters may be
    /// lowercase
    pub fn parse(text: &str) -> Option<Self> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let (rest, (zone, band, column, row, digits)) = grid_parts(&compact).ok()?;
        if !rest.is_empty() || !(1..=60).contains(&zone) {
            return None;
        }
        if digits.len() % 2 != 0 || digits.len() > 10 {
            return None;
        }

        let half = digits.len() / 2;
        let (east, north) = digits.split_at(half);
        Some(Self {
            zone,
            band,
            square: [column, row],
            easting: scale_digits(east)?,
            northing: scale_digits(north)?,
            precision: half as u8,
        })
    }
}

/// "123" at 3-digit precision is 12300 m
fn scale_digits(digits: &str) -> Option<u32> {
    if digits.is_empty() {
        return Some(0);
    }
    let value: u32 = digits.parse().ok()?;
    Some(value * 10u32.pow(5 - digits.len() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedConverter(f64, f64);

    impl GridConverter for FixedConverter {
        fn to_lat_lon(&self, _grid: &GridReference) -> Option<(f64, f64)> {
            Some((self.0, self.1))
        }
    }

    #[test]
    fn test_decimal_comma_and_space() {
        assert_eq!(parse_coordinates("15.5, 120.3", None), Some((15.5, 120.3)));
        assert_eq!(parse_coordinates("15.5 120.3", None), Some((15.5, 120.3)));
        assert_eq!(
            parse_coordinates("  -33.9,151.2  ", None),
            Some((-33.9, 151.2))
        );
    }

    #[test]
    fn test_decimal_out_of_range_rejected() {
        assert_eq!(parse_coordinates("200, 50", None), None);
        assert_eq!(parse_coordinates("45, 181", None), None);
        assert_eq!(parse_coordinates("90, -180", None), Some((90.0, -180.0)));
    }

    #[test]
    fn test_decimal_rejects_trailing_and_partial() {
        assert_eq!(parse_coordinates("15.5", None), None);
        assert_eq!(parse_coordinates("15.5, 120.3 north", None), None);
        assert_eq!(parse_coordinates("", None), None);
    }

    #[test]
    fn test_grid_reference_parse() {
        let g = GridReference::parse("4QFJ 12345 67890").unwrap();
        assert_eq!(g.zone, 4);
        assert_eq!(g.band, 'Q');
        assert_eq!(g.square, ['F', 'J']);
        assert_eq!((g.easting, g.northing), (12345, 67890));
        assert_eq!(g.precision, 5);

        let g = GridReference::parse("4qfj123678").unwrap();
        assert_eq!((g.easting, g.northing), (12300, 67800));

        let g = GridReference::parse("31NEA").unwrap();
        assert_eq!((g.easting, g.northing, g.precision), (0, 0, 0));
    }

    #[test]
    fn test_grid_reference_rejects_malformed() {
        assert!(GridReference::parse("61NEA0000000000").is_none());
        assert!(GridReference::parse("0NEA00").is_none());
        assert!(GridReference::parse("4IFJ1234").is_none());
        assert!(GridReference::parse("4QFJ123").is_none());
        assert!(GridReference::parse("4QFJ123456789012").is_none());
    }

    #[test]
    fn test_grid_dispatch_uses_converter() {
        let conv = FixedConverter(21.3, -157.9);
        assert_eq!(
            parse_coordinates("4QFJ 12345 67890", Some(&conv)),
            Some((21.3, -157.9))
        );
        // Without a converter grid text is not understood
        assert_eq!(parse_coordinates("4QFJ 12345 67890", None), None);
    }

    #[test]
    fn test_converter_result_validated() {
        let conv = FixedConverter(95.0, 10.0);
        assert_eq!(parse_coordinates("4QFJ1234", Some(&conv)), None);
    }
}
