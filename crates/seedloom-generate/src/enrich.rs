use serde::Serialize;

use seedloom_core::{CollectionConfig, GenerationCache};

/// Compact reference to an already-created record, as shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

/// Render a collection's prompt and append the records each foreign key may point at.
///
/// One listing is appended per foreign-key field, in field order, so a collection referenced
/// by two fields is listed twice. Related collections with no cached records are skipped; the
/// coercer repairs whatever the model invents for them.
pub fn enrich_prompt(config: &CollectionConfig, cache: &GenerationCache) -> String {
    let mut prompt = config.render_prompt();

    for related in config
        .foreign_key_fields()
        .filter_map(|field| field.related_collection())
    {
        let entities = entity_refs(cache, related);
        if entities.is_empty() {
            continue;
        }
        // Vec<EntityRef> has no failure path in serde_json.
        let listing = serde_json::to_string_pretty(&entities).unwrap_or_default();
        prompt.push_str(&format!("\n\nAvailable {related}:\n{listing}"));
    }

    prompt
}

/// Id/label pairs for every cached record of `collection` that has an id.
pub fn entity_refs(cache: &GenerationCache, collection: &str) -> Vec<EntityRef> {
    cache
        .records(collection)
        .unwrap_or_default()
        .iter()
        .filter_map(|record| {
            let id = record.id.clone()?;
            let name = record.label().unwrap_or_else(|| id.clone());
            Some(EntityRef { id, name })
        })
        .collect()
}
