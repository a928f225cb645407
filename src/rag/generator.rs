//! Answer generation with a language model.

use crate::config::Prompts;
use crate::error::{Result, VidsageError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Writes free-text answers from a question and retrieved context.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, question: &str, context: &str) -> Result<String>;
}

/// OpenAI chat-completion answer generator.
pub struct OpenAIGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: Prompts,
}

impl OpenAIGenerator {
    /// Create a generator for `model` with the default prompts.
    pub fn new(model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            prompts: Prompts::default(),
        })
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    fn build_messages(
        &self,
        question: &str,
        context: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context.to_string());
        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.answer.user, &vars);

        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.answer.system.clone())
                .build()
                .map_err(|e| VidsageError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| VidsageError::Generation(e.to_string()))?
                .into(),
        ])
    }
}

#[async_trait]
impl AnswerGenerator for OpenAIGenerator {
    #[instrument(skip(self, context), fields(model = %self.model))]
    async fn generate(&self, question: &str, context: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(self.build_messages(question, context)?)
            .temperature(0.3)
            .build()
            .map_err(|e| VidsageError::Generation(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            VidsageError::Generation(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| VidsageError::Generation("Empty response from LLM".to_string()))?;

        debug!("Generated {} character answer", answer.len());
        Ok(answer)
    }
}
