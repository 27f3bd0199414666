//! User-facing replies for review commands.

use crate::review::command::ReviewCommand;
use crate::review::forwarder::ForwardOutcome;

/// Usage text for `!avis-help`.
pub const HELP_TEXT: &str = "**📚 Bot Avis IFT2255**\n\n\
**Format:** `!avis CODE DIFF CHARGE [commentaire]`\n\n\
**Exemple:**\n\
```\n!avis IFT2255 4 3 Bon cours mais demandant.\n```\n\n\
**Paramètres:**\n\
• `CODE` — Sigle du cours (ex: IFT2255)\n\
• `DIFF` — Difficulté perçue (1 = facile, 5 = difficile)\n\
• `CHARGE` — Charge de travail (1 = légère, 5 = lourde)\n\
• `commentaire` — Optionnel, votre avis textuel\n\n\
**Exemples valides:**\n\
• `!avis IFT1015 2 2`\n\
• `!avis MAT1400 5 5 Très difficile!`\n\
• `!avis IFT2255 3 4 Projet intéressant mais long`";

/// Reply to a line that starts with `!avis` but does not parse.
pub const FORMAT_ERROR_TEXT: &str = "❌ Format invalide. Utilise: `!avis IFT2255 4 3 commentaire optionnel`\n\
Tape `!avis-help` pour plus d'infos.";

const CONNECTION_FAILURE_TEXT: &str =
    "⚠️ Impossible de joindre l'API. Vérifiez que le backend est démarré.";

const TIMEOUT_TEXT: &str = "⏱️ L'API met trop de temps à répondre.";

/// Acknowledgment added to the submitting message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Success,
    ApiError,
    Warning,
    Timeout,
    Unexpected,
}

impl Reaction {
    pub fn emoji(self) -> &'static str {
        match self {
            Reaction::Success => "✅",
            Reaction::ApiError => "❌",
            Reaction::Warning => "⚠️",
            Reaction::Timeout => "⏱️",
            Reaction::Unexpected => "💥",
        }
    }
}

/// Reaction and channel reply for a submission outcome.
pub fn outcome_reply(command: &ReviewCommand, outcome: &ForwardOutcome) -> (Reaction, String) {
    match outcome {
        ForwardOutcome::Success(_) => (Reaction::Success, confirmation(command)),
        ForwardOutcome::ApiError { status, detail } => (
            Reaction::ApiError,
            format!("❌ Erreur API ({}): {}", status, detail),
        ),
        ForwardOutcome::ConnectionFailure => {
            (Reaction::Warning, CONNECTION_FAILURE_TEXT.to_string())
        }
        ForwardOutcome::Timeout => (Reaction::Timeout, TIMEOUT_TEXT.to_string()),
        ForwardOutcome::UnexpectedFailure(message) => (
            Reaction::Unexpected,
            format!("💥 Erreur inattendue: {}", message),
        ),
    }
}

fn confirmation(command: &ReviewCommand) -> String {
    format!(
        "✅ **Avis enregistré!**\n• Cours: `{}`\n• Difficulté: {}\n• Charge: {}",
        command.course_code,
        "⭐".repeat(usize::from(command.difficulty)),
        "📚".repeat(usize::from(command.workload)),
    )
}
