use serde::{Deserialize, Deserializer};

/// Deserializes a value, treating empty strings as None.
/// Xero sends `""` for some unset identifier fields instead of leaving them out.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrValue<T> {
        Value(T),
        String(String),
    }

    match Option::<StringOrValue<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrValue::String(s)) if s.is_empty() => Ok(None),
        Some(StringOrValue::String(s)) => Err(serde::de::Error::custom(format!(
            "unexpected string value: {s}"
        ))),
        Some(StringOrValue::Value(v)) => Ok(Some(v)),
    }
}

/// Accepts either a JSON list of strings or one space-separated string.
pub fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        List(Vec<String>),
        String(String),
    }

    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::List(list)) => list,
        Some(StringOrList::String(s)) => s.split_whitespace().map(str::to_owned).collect(),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "super::empty_string_as_none")]
        id: Option<Uuid>,
        #[serde(default, deserialize_with = "super::string_or_list")]
        scope: Vec<String>,
    }

    #[test]
    fn empty_identifier_reads_as_none() {
        let holder: Holder = serde_json::from_str(r#"{"id": ""}"#).unwrap();
        assert!(holder.id.is_none());

        let holder: Holder =
            serde_json::from_str(r#"{"id": "6bd0b4e6-5f3b-4ad4-8ef7-1a2b3c4d5e6f"}"#).unwrap();
        assert!(holder.id.is_some());
    }

    #[test]
    fn scope_reads_from_string_or_list() {
        let holder: Holder = serde_json::from_str(r#"{"scope": "openid offline_access"}"#).unwrap();
        assert_eq!(holder.scope, vec!["openid", "offline_access"]);

        let holder: Holder = serde_json::from_str(r#"{"scope": ["accounting.reports.read"]}"#).unwrap();
        assert_eq!(holder.scope, vec!["accounting.reports.read"]);
    }
}
