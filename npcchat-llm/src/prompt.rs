//! Prompt templates for NPC replies.
//!
//! The persona template is rendered once per reply with the NPC's name and
//! current mood, then prefixed to the player's message.

/// Built-in guard persona. Placeholders: `{npc_name}`, `{mood}`.
pub const GUARD_SYSTEM: &str = r"You are a village guard NPC named {npc_name}. Your current mood towards the player is {mood}.
- If your mood is 'friendly', be helpful and welcoming.
- If your mood is 'neutral', be professional and concise.
- If your mood is 'angry', be dismissive and grumpy.
Keep your replies very short, like a real NPC in a game (1-2 sentences). Do not use markdown or emojis.";

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

/// Join rendered instructions and the player's line into the final prompt.
#[must_use]
pub fn compose_prompt(instructions: &str, player_text: &str) -> String {
    format!("{instructions}\n\nPlayer says: {player_text}")
}

/// A persona template bound to an NPC name.
#[derive(Debug, Clone)]
pub struct PersonaPrompt {
    npc_name: String,
    template: String,
}

impl PersonaPrompt {
    /// The built-in guard persona.
    #[must_use]
    pub fn builtin(npc_name: impl Into<String>) -> Self {
        Self::custom(npc_name, GUARD_SYSTEM)
    }

    /// A caller-supplied template using the same placeholders.
    #[must_use]
    pub fn custom(npc_name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            npc_name: npc_name.into(),
            template: template.into(),
        }
    }

    /// The NPC's name.
    #[must_use]
    pub fn npc_name(&self) -> &str {
        &self.npc_name
    }

    /// System instructions for the given mood.
    #[must_use]
    pub fn instructions(&self, mood: &str) -> String {
        render_template(&self.template, &[("npc_name", self.npc_name.as_str()), ("mood", mood)])
    }

    /// Full prompt for one player message.
    #[must_use]
    pub fn render(&self, mood: &str, player_text: &str) -> String {
        compose_prompt(&self.instructions(mood), player_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_rendering_works() {
        let rendered = render_template(
            "Hello {name}, you are a {role}.",
            &[("name", "Gregor"), ("role", "guard")],
        );
        assert_eq!(rendered, "Hello Gregor, you are a guard.");
    }

    #[test]
    fn template_handles_missing_vars() {
        let rendered = render_template("Hello {name}, {unknown}.", &[("name", "Gregor")]);
        assert_eq!(rendered, "Hello Gregor, {unknown}.");
    }

    #[test]
    fn builtin_persona_mentions_name_and_mood() {
        let persona = PersonaPrompt::builtin("Gregor");
        let text = persona.instructions("angry");
        assert!(text.contains("named Gregor"));
        assert!(text.contains("towards the player is angry"));
        assert!(text.contains("1-2 sentences"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn builtin_persona_covers_every_mood() {
        for directive in ["helpful and welcoming", "professional and concise", "dismissive and grumpy"] {
            assert!(GUARD_SYSTEM.contains(directive), "missing directive: {directive}");
        }
        assert!(GUARD_SYSTEM.contains("Do not use markdown or emojis"));
    }

    #[test]
    fn prompt_ends_with_player_line() {
        let persona = PersonaPrompt::builtin("Gregor");
        let prompt = persona.render("neutral", "where is the inn?");
        assert!(prompt.starts_with("You are a village guard"));
        assert!(prompt.ends_with("\n\nPlayer says: where is the inn?"));
    }

    #[test]
    fn custom_template_used() {
        let persona = PersonaPrompt::custom("Mira", "{npc_name} feels {mood}.");
        assert_eq!(persona.instructions("friendly"), "Mira feels friendly.");
    }
}
