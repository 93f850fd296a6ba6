use crate::config::{parse_timeout_secs, SETTING_KEYS};
use crate::db::Database;
use std::collections::BTreeMap;

pub fn get_settings(db: &Database) -> Result<BTreeMap<String, String>, String> {
    let mut map = BTreeMap::new();
    for key in SETTING_KEYS {
        if let Some(value) = db.get_setting(key).map_err(|e| e.to_string())? {
            map.insert(key.to_string(), value);
        }
    }
    Ok(map)
}

pub fn set_setting(db: &Database, key: &str, value: &str) -> Result<(), String> {
    if !SETTING_KEYS.contains(&key) {
        return Err(format!("Unknown setting key: {}", key));
    }
    let value = value.trim();
    if key.ends_with("_timeout_secs") {
        parse_timeout_secs(value)?;
    } else if key == "gateway_base_url"
        && !(value.starts_with("http://") || value.starts_with("https://"))
    {
        return Err(format!("Gateway URL must start with http:// or https://, got: {}", value));
    } else if value.is_empty() {
        return Err(format!("Setting {} cannot be empty", key));
    }
    db.set_setting(key, value).map_err(|e| e.to_string())
}

pub fn delete_setting(db: &Database, key: &str) -> Result<(), String> {
    if !SETTING_KEYS.contains(&key) {
        return Err(format!("Unknown setting key: {}", key));
    }
    db.delete_setting(key).map_err(|e| e.to_string())
}
