//! Balance aggregation over a basket of token outputs.

use std::collections::BTreeMap;

use crate::codec;
use crate::types::{AssetId, Outpoint, OutputRecord};

/// Holdings across one basket, kept separate per asset.
///
/// Distinct assets that share a basket are never conflated into one
/// figure; `total` is the sum across all of them and is only meaningful
/// when every entry denominates the same thing.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct BalanceReport {
    /// Units held, per asset identifier.
    pub per_asset: BTreeMap<AssetId, u128>,
    /// Grand total across every decoded output, regardless of asset.
    pub total: u128,
    /// Outputs whose data fields did not decode as a token record.
    /// Non-fatal: the rest of the scan still counts.
    pub skipped: Vec<Outpoint>,
}

/// Decode every output and accumulate amounts per asset.
pub fn aggregate(outputs: &[OutputRecord]) -> BalanceReport {
    let mut report = BalanceReport::default();

    for output in outputs {
        match codec::decode(&output.fields) {
            Ok(record) => {
                *report.per_asset.entry(record.asset_id).or_insert(0) += u128::from(record.amount);
                report.total += u128::from(record.amount);
            }
            Err(e) => {
                log::debug!("skipping output {}: {e}", output.outpoint);
                report.skipped.push(output.outpoint.clone());
            }
        }
    }

    report
}
