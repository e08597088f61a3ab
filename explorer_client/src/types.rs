use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entry of a Blockscout `account/txlist` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockscoutTransaction {
    pub hash: String,
    pub from: String,
    /// Empty or null for contract creations
    #[serde(default)]
    pub to: Option<String>,
    /// Wei, as a decimal string
    pub value: String,
    #[serde(rename = "timeStamp", default)]
    pub time_stamp: Option<String>,
}

/// Entry of a Solscan account transaction list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolscanTransaction {
    #[serde(rename = "txHash", alias = "tx_hash", alias = "signature")]
    pub tx_hash: String,
    #[serde(default)]
    pub fee: Option<Value>,
    #[serde(default)]
    pub lamport: Option<Value>,
    #[serde(default)]
    pub signer: Vec<String>,
    #[serde(rename = "blockTime", alias = "block_time", default)]
    pub block_time: Option<i64>,
}

impl SolscanTransaction {
    /// Whether the entry carries the fee/lamport detail needed to treat it as a transfer
    pub fn has_fee_detail(&self) -> bool {
        self.fee.as_ref().is_some_and(|v| !v.is_null())
            || self.lamport.as_ref().is_some_and(|v| !v.is_null())
    }
}

/// Entry of a Blockchair dashboard `transactions` list (with `transaction_details=true`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchairTransaction {
    #[serde(alias = "transaction_hash")]
    pub hash: String,
    /// Smallest native unit, number or decimal string
    pub balance_change: Value,
    #[serde(default)]
    pub time: Option<String>,
}

/// Read an amount in the smallest native unit from a JSON number or decimal string.
///
/// Large EVM values arrive as strings; Blockchair sends plain numbers that
/// may exceed `u64`, which serde_json then holds as `f64`.
pub fn native_amount(value: &Value) -> Option<i128> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i128>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i128))
        }
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| n.as_f64().map(|f| f.round() as i128)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_amount_shapes() {
        assert_eq!(native_amount(&json!("60000000000000000000")), Some(60_000_000_000_000_000_000));
        assert_eq!(native_amount(&json!(1500)), Some(1500));
        assert_eq!(native_amount(&json!(-42)), Some(-42));
        assert_eq!(native_amount(&json!(5e18)), Some(5_000_000_000_000_000_000));
        assert_eq!(native_amount(&json!("not a number")), None);
        assert_eq!(native_amount(&Value::Null), None);
    }

    #[test]
    fn test_solscan_entry_aliases() {
        let v1: SolscanTransaction = serde_json::from_value(json!({
            "txHash": "sig1",
            "fee": 5000,
            "signer": ["FeePayer1"]
        }))
        .unwrap();
        assert_eq!(v1.tx_hash, "sig1");
        assert!(v1.has_fee_detail());

        let v2: SolscanTransaction = serde_json::from_value(json!({
            "tx_hash": "sig2",
            "signer": []
        }))
        .unwrap();
        assert_eq!(v2.tx_hash, "sig2");
        assert!(!v2.has_fee_detail());

        let unnamed = serde_json::from_value::<SolscanTransaction>(json!({
            "fee": 5000,
            "signer": ["FeePayer1"]
        }));
        assert!(unnamed.is_err());
    }
}
