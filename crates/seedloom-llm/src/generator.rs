use async_trait::async_trait;

use seedloom_core::{FieldKind, FieldSpec, Generator, RawItem, Result as CoreResult};

use crate::client::ChatClient;
use crate::config::LlmConfig;
use crate::error::Result;
use crate::extract::extract_json_array;

/// [`Generator`] backed by an OpenAI-compatible chat endpoint.
pub struct LlmGenerator {
    client: ChatClient,
}

impl LlmGenerator {
    pub fn new(config: LlmConfig) -> Result<Self> {
        Ok(Self::from_client(ChatClient::new(config)?))
    }

    pub fn from_client(client: ChatClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn generate(&self, prompt: &str, fields: &[FieldSpec]) -> CoreResult<Vec<RawItem>> {
        let message = format!("{prompt}\n\n{}", format_instruction(fields));
        let reply = self.client.complete(&message).await?;
        Ok(extract_json_array(&reply)?)
    }
}

/// Instruction appended to every prompt describing the expected array shape.
pub fn format_instruction(fields: &[FieldSpec]) -> String {
    let described: Vec<String> = fields
        .iter()
        .map(|field| format!("{} ({})", field.name, describe(&field.kind)))
        .collect();
    format!(
        "Respond only with a JSON array of objects. Each object must contain these fields, in order: {}.",
        described.join(", ")
    )
}

fn describe(kind: &FieldKind) -> String {
    match kind {
        FieldKind::String => "string".to_string(),
        FieldKind::Numeric => "number".to_string(),
        FieldKind::Boolean => "boolean".to_string(),
        FieldKind::Null => "null".to_string(),
        FieldKind::ForeignKey { related_collection } => {
            format!("id of one of the available {related_collection}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_lists_fields_in_order() {
        let fields = vec![
            FieldSpec::string("name"),
            FieldSpec::numeric("base_price"),
            FieldSpec::foreign_key("brand", "brands"),
            FieldSpec::null("images"),
            FieldSpec::boolean("is_active"),
        ];

        assert_eq!(
            format_instruction(&fields),
            "Respond only with a JSON array of objects. Each object must contain these fields, \
             in order: name (string), base_price (number), brand (id of one of the available \
             brands), images (null), is_active (boolean)."
        );
    }
}
