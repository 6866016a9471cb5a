use serde_json::{Map, Number, Value};

use seedloom_core::{CollectionConfig, FieldKind, FieldSpec, GeneratedRecord, GenerationCache, RawItem};

use crate::errors::{Result, SeedError};
use crate::foreign::{IdSelector, repair_foreign_key};

/// Coerce a generated batch into records shaped by `config`.
///
/// The first invalid item fails the whole batch; no partial output is returned.
pub fn coerce_batch(
    config: &CollectionConfig,
    items: &[RawItem],
    cache: &GenerationCache,
    selector: &mut dyn IdSelector,
) -> Result<Vec<GeneratedRecord>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| coerce_item(config, index, item, cache, &mut *selector))
        .collect()
}

/// Coerce a single item; `index` is only used for error reporting.
pub fn coerce_item(
    config: &CollectionConfig,
    index: usize,
    item: &RawItem,
    cache: &GenerationCache,
    selector: &mut dyn IdSelector,
) -> Result<GeneratedRecord> {
    let mut values = Map::with_capacity(config.fields.len());

    for field in &config.fields {
        let raw = item.get(&field.name);
        let value = match &field.kind {
            FieldKind::String => require(config, index, field, raw)?.clone(),
            FieldKind::Numeric => {
                let raw = require(config, index, field, raw)?;
                let number = to_number(raw).ok_or_else(|| SeedError::InvalidNumeric {
                    collection: config.name.clone(),
                    item: index,
                    field: field.name.clone(),
                    value: raw.to_string(),
                })?;
                Value::Number(number)
            }
            FieldKind::Boolean => Value::Bool(to_bool(raw)),
            FieldKind::Null => Value::Null,
            FieldKind::ForeignKey { related_collection } => {
                let ids = cache.ids(related_collection);
                if ids.is_empty() {
                    return Err(SeedError::EmptyForeignKeyPool {
                        collection: config.name.clone(),
                        field: field.name.clone(),
                        related: related_collection.clone(),
                    });
                }
                repair_foreign_key(raw, &ids, selector)
            }
        };
        values.insert(field.name.clone(), value);
    }

    Ok(GeneratedRecord::new(values))
}

fn require<'a>(
    config: &CollectionConfig,
    index: usize,
    field: &FieldSpec,
    raw: Option<&'a Value>,
) -> Result<&'a Value> {
    raw.ok_or_else(|| SeedError::MissingField {
        collection: config.name.clone(),
        item: index,
        field: field.name.clone(),
    })
}

fn to_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) => Some(number.clone()),
        Value::String(text) => parse_number(text.trim()),
        Value::Bool(flag) => Some(Number::from(u8::from(*flag))),
        Value::Null => Some(Number::from(0)),
        _ => None,
    }
}

/// Blank text reads as zero; anything else must parse as a finite number.
fn parse_number(text: &str) -> Option<Number> {
    if text.is_empty() {
        return Some(Number::from(0));
    }
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    // from_f64 rejects NaN and infinities, which `str::parse` accepts.
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

fn to_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.to_lowercase() == "true",
        Some(other) => other.to_string().to_lowercase() == "true",
        None => false,
    }
}
