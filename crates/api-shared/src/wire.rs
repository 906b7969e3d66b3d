//! JSON bodies returned by the HTTP endpoints.
//!
//! Field names are PascalCase to stay compatible with existing clients.

use holdings_core::{HoldingSummary, ServerInfo, ShardDescriptor};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Contents and flags of one holding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct HoldingRes {
    /// Track paths relative to the holding's `music/` directory.
    pub file_list: Vec<String>,
    pub has_artwork: bool,
    pub locked: bool,
}

impl From<HoldingSummary> for HoldingRes {
    fn from(summary: HoldingSummary) -> Self {
        Self {
            file_list: summary.tracks,
            has_artwork: summary.has_artwork,
            locked: summary.locked,
        }
    }
}

/// A UUID range served by this instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShardRes {
    #[serde(rename = "MinUUID")]
    pub min_uuid: String,
    #[serde(rename = "MaxUUID")]
    pub max_uuid: String,
    #[serde(rename = "Writable")]
    pub writable: bool,
}

impl From<ShardDescriptor> for ShardRes {
    fn from(shard: ShardDescriptor) -> Self {
        Self {
            min_uuid: shard.min_uuid,
            max_uuid: shard.max_uuid,
            writable: shard.writable,
        }
    }
}

/// Response of `GET /version`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ServerInfoRes {
    pub version: String,
    /// Bytes available on the library filesystem.
    pub free_space: u64,
    pub shards: Vec<ShardRes>,
}

impl From<ServerInfo> for ServerInfoRes {
    fn from(info: ServerInfo) -> Self {
        Self {
            version: info.version,
            free_space: info.free_space,
            shards: info.shards.into_iter().map(ShardRes::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_holding_res_field_names() {
        let res = HoldingRes::from(HoldingSummary {
            tracks: vec!["a.flac".into(), "cd2/b.flac".into()],
            has_artwork: false,
            locked: true,
        });

        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            json!({
                "FileList": ["a.flac", "cd2/b.flac"],
                "HasArtwork": false,
                "Locked": true
            })
        );
    }

    #[test]
    fn test_server_info_res_field_names() {
        let res = ServerInfoRes::from(ServerInfo {
            version: "1.2.3".into(),
            free_space: 42,
            shards: vec![ShardDescriptor::full_range()],
        });

        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            json!({
                "Version": "1.2.3",
                "FreeSpace": 42,
                "Shards": [{
                    "MinUUID": "00000000-0000-0000-0000-000000000000",
                    "MaxUUID": "ffffffff-ffff-ffff-ffff-ffffffffffff",
                    "Writable": true
                }]
            })
        );
    }
}
