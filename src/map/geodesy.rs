//! Grid reference -> UTM -> WGS84 latitude/longitude
//!
//! Standard lettering only; the Norway/Svalbard zone exceptions are not
//! handled.

use crate::map::coord::{GridConverter, GridReference};

const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

const COLUMN_LETTERS: [&str; 3] = ["ABCDEFGH", "JKLMNPQR", "STUVWXYZ"];
const ROW_LETTERS: &str = "ABCDEFGHJKLMNPQRSTUV";

/// Lowest northing (southern values include the false northing) per band
fn band_min_northing(band: char) -> Option<f64> {
    let meters = match band {
        'C' => 1_100_000.0,
        'D' => 2_000_000.0,
        'E' => 2_800_000.0,
        'F' => 3_700_000.0,
        'G' => 4_600_000.0,
        'H' => 5_500_000.0,
        'J' => 6_400_000.0,
        'K' => 7_300_000.0,
        'L' => 8_200_000.0,
        'M' => 9_100_000.0,
        'N' => 0.0,
        'P' => 800_000.0,
        'Q' => 1_700_000.0,
        'R' => 2_600_000.0,
        'S' => 3_500_000.0,
        'T' => 4_400_000.0,
        'U' => 5_300_000.0,
        'V' => 6_200_000.0,
        'W' => 7_000_000.0,
        'X' => 7_900_000.0,
        _ => return None,
    };
    Some(meters)
}

/// UTM position in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Utm {
    pub zone: u8,
    pub southern: bool,
    pub easting: f64,
    pub northing: f64,
}

/// Converts grid references with the WGS84 transverse Mercator inverse
#[derive(Debug, Clone, Copy, Default)]
pub struct UtmGridConverter;

impl UtmGridConverter {
    pub fn to_utm(&self, grid: &GridReference) -> Option<Utm> {
        if !(1..=60).contains(&grid.zone) {
            return None;
        }
        let set = (grid.zone as usize - 1) % 6 + 1;
        let [column, row] = grid.square;

        let column_index = COLUMN_LETTERS[(set - 1) % 3].find(column)?;
        let easting = (column_index as f64 + 1.0) * 100_000.0 + grid.easting as f64;

        let mut row_index = ROW_LETTERS.find(row)?;
        if set % 2 == 0 {
            row_index = (row_index + 15) % 20;
        }
        let mut northing = row_index as f64 * 100_000.0 + grid.northing as f64;

        let min = band_min_northing(grid.band)?;
        while northing < min {
            northing += 2_000_000.0;
        }

        Some(Utm {
            zone: grid.zone,
            southern: grid.band < 'N',
            easting,
            northing,
        })
    }

    pub fn utm_to_lat_lon(&self, utm: &Utm) -> (f64, f64) {
        let e2 = FLATTENING * (2.0 - FLATTENING);
        let ep2 = e2 / (1.0 - e2);
        let x = utm.easting - FALSE_EASTING;
        let y = if utm.southern {
            utm.northing - FALSE_NORTHING_SOUTH
        } else {
            utm.northing
        };
        let lon0 = (utm.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;

        let m = y / SCALE_FACTOR;
        let mu = m / (SEMI_MAJOR_AXIS * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));
        let sq = (1.0 - e2).sqrt();
        let e1 = (1.0 - sq) / (1.0 + sq);

        // Footpoint latitude
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let denom = 1.0 - e2 * sin1 * sin1;
        let n1 = SEMI_MAJOR_AXIS / denom.sqrt();
        let t1 = tan1 * tan1;
        let c1 = ep2 * cos1 * cos1;
        let r1 = SEMI_MAJOR_AXIS * (1.0 - e2) / denom.powf(1.5);
        let d = x / (n1 * SCALE_FACTOR);

        let lat = phi1
            - (n1 * tan1 / r1)
                * (d.powi(2) / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let dlon = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
                / 120.0)
            / cos1;

        (lat.to_degrees(), lon0 + dlon.to_degrees())
    }
}

impl GridConverter for UtmGridConverter {
    fn to_lat_lon(&self, grid: &GridReference) -> Option<(f64, f64)> {
        let utm = self.to_utm(grid)?;
        Some(self.utm_to_lat_lon(&utm))
    }
}
