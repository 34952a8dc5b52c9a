use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::Configuration;
use crate::error::Result;

pub fn fingerprint(config: &Configuration) -> Result<String> {
    Ok(digest_value(&canonical_value(config)?))
}

pub fn fingerprint_with_dataset(config: &Configuration, dataset_digest: &str) -> Result<String> {
    let mut value = canonical_value(config)?;
    if let Value::Object(map) = &mut value {
        map.insert("datasetDigest".to_owned(), Value::String(dataset_digest.to_owned()));
    }
    Ok(digest_value(&value))
}

fn canonical_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(sort_keys(serde_json::to_value(value)?))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn digest_value(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}
