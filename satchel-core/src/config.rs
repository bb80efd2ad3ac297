//! Process-wide token configuration, passed explicitly into each engine.

use crate::types::{ProtocolId, SecurityLevel};

/// Everything the engines need to know about "this token account".
///
/// Construct once at startup and pass by reference; there is no global
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// The basket that groups this account's token outputs.
    pub basket: String,
    /// The protocol namespace keys are derived under.
    pub protocol_id: ProtocolId,
    /// The stable key id used for every mint, so all mints from one
    /// issuer are verifiably from the same authority.
    pub mint_key_id: String,
    /// Native-currency value carried by each token output.
    pub token_satoshis: u64,
    /// The relay inbox token notices are delivered to.
    pub inbox: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        TokenConfig {
            basket: "satchel tokens".to_string(),
            protocol_id: ProtocolId {
                security_level: SecurityLevel::Silent,
                protocol: "satcheltokens".to_string(),
            },
            mint_key_id: "mint_albatross".to_string(),
            token_satoshis: 1,
            inbox: "token_inbox".to_string(),
        }
    }
}
