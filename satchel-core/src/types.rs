//! The common types used across the Satchel protocol, and not specific to
//! any one engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The asset identifier string carried by a freshly minted token output.
///
/// It is transient: valid only inside the minting transaction, and replaced
/// by the minting outpoint the first time the token is spent.
pub const MINT_SENTINEL: &str = "mint";

/// A reference to an output that is expected to exist on the ledger.
///
/// Displayed and parsed as `"<txid>.<vout>"`, which is also how it appears
/// on the wire and as a storage key.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
#[serde(into = "String", try_from = "String")]
pub struct Outpoint {
    /// Hex id of the transaction that created this output
    pub txid: String,
    /// The index of this output among all outputs created by the same transaction
    pub vout: u32,
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.txid, self.vout)
    }
}

impl FromStr for Outpoint {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (txid, vout) = s
            .split_once('.')
            .ok_or_else(|| ValidationError::new("outpoint", "expected \"<txid>.<vout>\""))?;
        if txid.is_empty() || !txid.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::new("outpoint", "txid must be hex"));
        }
        let vout = vout
            .parse()
            .map_err(|_| ValidationError::new("outpoint", "vout must be a u32"))?;
        Ok(Outpoint {
            txid: txid.to_string(),
            vout,
        })
    }
}

impl From<Outpoint> for String {
    fn from(op: Outpoint) -> Self {
        op.to_string()
    }
}

impl TryFrom<String> for Outpoint {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A token's type tag.
///
/// Either the reserved [`MINT_SENTINEL`] literal or the stable
/// `"<txid>.<vout>"` form naming the original minting output. Decoding
/// performs no semantic validation of the string; only encoding rejects
/// the empty identifier.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// The transient sentinel identifier carried inside a minting transaction.
    pub fn mint() -> Self {
        AssetId(MINT_SENTINEL.to_string())
    }

    /// The stable identifier anchored to the minting outpoint.
    pub fn from_outpoint(op: &Outpoint) -> Self {
        AssetId(op.to_string())
    }

    pub fn new(s: impl Into<String>) -> Self {
        AssetId(s.into())
    }

    pub fn is_mint(&self) -> bool {
        self.0 == MINT_SENTINEL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The decoded form of the two data fields embedded in a token output's
/// locking condition.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct TokenRecord {
    pub asset_id: AssetId,
    pub amount: u64,
}

impl TokenRecord {
    pub fn new(asset_id: AssetId, amount: u64) -> Self {
        TokenRecord { asset_id, amount }
    }
}

/// How strictly the wallet collaborator gates key derivation under a
/// protocol namespace.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(into = "u8", try_from = "u8")]
pub enum SecurityLevel {
    /// Derivation requires no user interaction.
    Silent,
    /// Derivation requires a one-time grant per application.
    App,
    /// Derivation requires a grant per counterparty.
    Counterparty,
}

impl From<SecurityLevel> for u8 {
    fn from(level: SecurityLevel) -> Self {
        match level {
            SecurityLevel::Silent => 0,
            SecurityLevel::App => 1,
            SecurityLevel::Counterparty => 2,
        }
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SecurityLevel::Silent),
            1 => Ok(SecurityLevel::App),
            2 => Ok(SecurityLevel::Counterparty),
            _ => Err(ValidationError::new("security level", "must be 0, 1 or 2")),
        }
    }
}

/// The protocol namespace a key is derived under, serialized as the
/// 2-tuple `[level, name]` the wallet collaborator expects.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(into = "(u8, String)", try_from = "(u8, String)")]
pub struct ProtocolId {
    pub security_level: SecurityLevel,
    pub protocol: String,
}

impl From<ProtocolId> for (u8, String) {
    fn from(id: ProtocolId) -> Self {
        (id.security_level.into(), id.protocol)
    }
}

impl TryFrom<(u8, String)> for ProtocolId {
    type Error = ValidationError;

    fn try_from((level, protocol): (u8, String)) -> Result<Self, Self::Error> {
        Ok(ProtocolId {
            security_level: level.try_into()?,
            protocol,
        })
    }
}

/// The other party a key is derived against: the wallet's own identity,
/// or a specific counterparty's identity public key.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(into = "String", try_from = "String")]
pub enum Counterparty {
    SelfKey,
    Key(String),
}

impl From<Counterparty> for String {
    fn from(cp: Counterparty) -> Self {
        match cp {
            Counterparty::SelfKey => "self".to_string(),
            Counterparty::Key(key) => key,
        }
    }
}

impl TryFrom<String> for Counterparty {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Err(ValidationError::new("counterparty", "must not be empty"));
        }
        Ok(match s.as_str() {
            "self" => Counterparty::SelfKey,
            _ => Counterparty::Key(s),
        })
    }
}

/// The key-derivation coordinates required to later authorize spending one
/// specific output.
///
/// Stored out-of-band, attached 1:1 to the output it unlocks. Losing this
/// record permanently strands the value it guards.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UnlockMetadata {
    pub protocol_id: ProtocolId,
    #[serde(rename = "keyID")]
    pub key_id: String,
    pub counterparty: Counterparty,
}

/// One spendable output as reported by the wallet collaborator's
/// `list_outputs`. Never mutated by this crate.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct OutputRecord {
    pub outpoint: Outpoint,
    pub satoshis: u64,
    /// The data fields embedded in the output's locking condition.
    #[serde(with = "hex_fields")]
    pub fields: Vec<Vec<u8>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Serde helper: a list of byte fields as a list of hex strings.
pub mod hex_fields {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(fields: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(fields.iter().map(hex::encode))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .into_iter()
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outpoint_round_trips_through_display() {
        let op = Outpoint {
            txid: "ab".repeat(32),
            vout: 7,
        };
        let parsed: Outpoint = op.to_string().parse().unwrap();
        assert_eq!(parsed, op);
    }

    #[test]
    fn outpoint_rejects_missing_separator() {
        assert!("abcdef".parse::<Outpoint>().is_err());
    }

    #[test]
    fn outpoint_rejects_non_hex_txid() {
        assert!("not-hex.0".parse::<Outpoint>().is_err());
    }

    #[test]
    fn asset_id_from_outpoint_is_not_mint() {
        let op = Outpoint {
            txid: "cd".repeat(32),
            vout: 0,
        };
        let id = AssetId::from_outpoint(&op);
        assert!(!id.is_mint());
        assert!(AssetId::mint().is_mint());
    }

    #[test]
    fn unlock_metadata_serializes_to_wallet_wire_shape() {
        let unlock = UnlockMetadata {
            protocol_id: ProtocolId {
                security_level: SecurityLevel::Silent,
                protocol: "satcheltokens".to_string(),
            },
            key_id: "mint_albatross".to_string(),
            counterparty: Counterparty::SelfKey,
        };
        let json = serde_json::to_value(&unlock).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "protocolId": [0, "satcheltokens"],
                "keyID": "mint_albatross",
                "counterparty": "self",
            })
        );
        let back: UnlockMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, unlock);
    }
}
