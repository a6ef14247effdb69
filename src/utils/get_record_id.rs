use serde::Serializer;
use surrealdb::RecordId;

/// Accepts either a bare key (`abc123`) or a full `table:key` string for `table`.
pub fn get_record_id_from_string(table: &str, val: &str) -> RecordId {
    let val = val.trim();
    let key = match val.split_once(':') {
        Some((prefix, key)) if prefix == table => key,
        _ => val,
    };
    RecordId::from_table_key(table, key)
}

/// The bare key of a record id, without the table prefix or SurrealQL escaping.
pub fn record_key(id: &RecordId) -> String {
    let rendered = id.to_string();
    let key = rendered
        .split_once(':')
        .map(|(_, key)| key)
        .unwrap_or(rendered.as_str());
    key.trim_start_matches(['⟨', '`'])
        .trim_end_matches(['⟩', '`'])
        .to_string()
}

pub fn serialize_record_key<S: Serializer>(id: &RecordId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&record_key(id))
}
