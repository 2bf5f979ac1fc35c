use serde::{Deserialize, Serialize, Serializer};
use trading_core::{InstrumentId, StrategyId};

use super::channel::Channel;

/// Outbound control message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Directive {
    Subscribe {
        #[serde(serialize_with = "serialize_carriers")]
        channels: Vec<Channel>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        history: Option<u32>,
        #[serde(
            rename = "starlisting_ids",
            default,
            skip_serializing_if = "Vec::is_empty"
        )]
        instrument_ids: Vec<InstrumentId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filters: Option<DirectiveFilters>,
    },
    Unsubscribe {
        #[serde(serialize_with = "serialize_carriers")]
        channels: Vec<Channel>,
    },
}

/// Channels as the server knows them: each mapped to its carrier, first
/// occurrence kept
fn serialize_carriers<S: Serializer>(
    channels: &[Channel],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut carriers: Vec<Channel> = Vec::with_capacity(channels.len());
    for channel in channels {
        let carrier = channel.carrier();
        if !carriers.contains(&carrier) {
            carriers.push(carrier);
        }
    }
    serializer.collect_seq(carriers)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveFilters {
    pub strategy_id: StrategyId,
}

impl Directive {
    pub fn unsubscribe(channels: Vec<Channel>) -> Self {
        Directive::Unsubscribe { channels }
    }

    pub fn channels(&self) -> &[Channel] {
        match self {
            Directive::Subscribe { channels, .. } | Directive::Unsubscribe { channels } => channels,
        }
    }

    pub fn is_subscribe(&self) -> bool {
        matches!(self, Directive::Subscribe { .. })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
