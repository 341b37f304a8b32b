use super::chat_model_interface::ChatMessage;

/// Placeholder replaced by the caller's input when the template is rendered.
pub const INPUT_VARIABLE: &str = "{input}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    Human,
}

impl PromptRole {
    /// Role name on the OpenAI-compatible wire.
    fn wire_name(self) -> &'static str {
        match self {
            PromptRole::System => "system",
            PromptRole::Human => "user",
        }
    }
}

/// An ordered list of role/template pairs.
#[derive(Debug, Clone)]
pub struct ChatPromptTemplate {
    messages: Vec<(PromptRole, String)>,
}

impl ChatPromptTemplate {
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = (PromptRole, S)>,
        S: Into<String>,
    {
        Self {
            messages: messages
                .into_iter()
                .map(|(role, template)| (role, template.into()))
                .collect(),
        }
    }

    /// Render every turn, substituting `{input}`.
    ///
    /// Substitution happens on the template only, so braces inside `input`
    /// are passed through untouched.
    pub fn format_messages(&self, input: &str) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(|(role, template)| {
                ChatMessage::new(role.wire_name(), template.replace(INPUT_VARIABLE, input))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_system_and_human_turns() {
        let prompt = ChatPromptTemplate::from_messages([
            (PromptRole::System, "You are a helpful AI assistant."),
            (PromptRole::Human, "{input}"),
        ]);

        let messages = prompt.format_messages("What is {input}?");

        assert_eq!(
            messages,
            vec![
                ChatMessage::new("system", "You are a helpful AI assistant."),
                ChatMessage::new("user", "What is {input}?"),
            ]
        );
    }
}
