//! Superlayer identifiers.

use std::fmt;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies one superlayer of a drift-tube chamber.
///
/// Superlayers 1 and 3 measure the bending (phi) coordinate, superlayer 2
/// measures the longitudinal (theta) coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawSuperLayerId"))]
pub struct SuperLayerId {
    wheel: i8,
    station: u8,
    sector: u8,
    superlayer: u8,
}

impl SuperLayerId {
    /// Superlayer index of the theta-measuring superlayer.
    pub const THETA_SUPERLAYER: u8 = 2;

    /// Creates a superlayer id, rejecting a superlayer index outside 1..=3.
    pub fn new(wheel: i8, station: u8, sector: u8, superlayer: u8) -> Result<Self> {
        if !(1..=3).contains(&superlayer) {
            return Err(Error::InvalidSuperLayer(superlayer));
        }
        Ok(Self {
            wheel,
            station,
            sector,
            superlayer,
        })
    }

    /// Wheel number (-2..=2 in the barrel).
    #[inline]
    #[must_use]
    pub fn wheel(&self) -> i8 {
        self.wheel
    }

    /// Station number.
    #[inline]
    #[must_use]
    pub fn station(&self) -> u8 {
        self.station
    }

    /// Sector number.
    #[inline]
    #[must_use]
    pub fn sector(&self) -> u8 {
        self.sector
    }

    /// Superlayer index within the chamber (1..=3).
    #[inline]
    #[must_use]
    pub fn superlayer(&self) -> u8 {
        self.superlayer
    }

    /// True for the theta-measuring superlayer.
    #[inline]
    #[must_use]
    pub fn is_theta(&self) -> bool {
        self.superlayer == Self::THETA_SUPERLAYER
    }

    /// True if both ids belong to the same chamber.
    #[must_use]
    pub fn same_chamber(&self, other: &Self) -> bool {
        self.wheel == other.wheel && self.station == other.station && self.sector == other.sector
    }
}

impl fmt::Display for SuperLayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wh:{} St:{} Se:{} SL:{}",
            self.wheel, self.station, self.sector, self.superlayer
        )
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawSuperLayerId {
    wheel: i8,
    station: u8,
    sector: u8,
    superlayer: u8,
}

#[cfg(feature = "serde")]
impl TryFrom<RawSuperLayerId> for SuperLayerId {
    type Error = Error;

    fn try_from(raw: RawSuperLayerId) -> Result<Self> {
        Self::new(raw.wheel, raw.station, raw.sector, raw.superlayer)
    }
}
