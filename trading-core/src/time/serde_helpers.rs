//! `deserialize_with` adapters that normalize wire timestamps at decode time

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use super::WireTime;
use crate::value_objects::EpochSeconds;

/// ISO string or epoch seconds
pub fn epoch_seconds<'de, D>(deserializer: D) -> Result<EpochSeconds, D::Error>
where
    D: Deserializer<'de>,
{
    WireTime::deserialize(deserializer)?
        .to_epoch_seconds()
        .map_err(D::Error::custom)
}

/// ISO string or epoch milliseconds
pub fn epoch_millis<'de, D>(deserializer: D) -> Result<EpochSeconds, D::Error>
where
    D: Deserializer<'de>,
{
    WireTime::deserialize(deserializer)?
        .millis_to_epoch_seconds()
        .map_err(D::Error::custom)
}

/// Optional ISO string or epoch milliseconds; `null` stays `None`
pub fn option_epoch_millis<'de, D>(deserializer: D) -> Result<Option<EpochSeconds>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WireTime>::deserialize(deserializer)?
        .map(|t| t.millis_to_epoch_seconds())
        .transpose()
        .map_err(D::Error::custom)
}
