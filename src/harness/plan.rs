// src/harness/plan.rs

use crate::config::template::{render, TemplateVars};
use crate::config::{LanguageSection, ServerEndpoint};
use crate::types::Language;

/// Concrete commands for one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    /// No run command configured for the language; a human has to look.
    ManualReview { language: Language },
    /// Optionally build, then run.
    Execute {
        build: Option<String>,
        run: String,
    },
}

impl LaunchPlan {
    /// Render the configured templates for `language`.
    pub fn resolve(
        languages: &LanguageSection,
        language: Language,
        target_name: &str,
        server: &ServerEndpoint,
    ) -> Self {
        let commands = languages.commands(language);
        let vars = TemplateVars {
            name: target_name,
            host: &server.host,
            port: server.port,
        };

        match &commands.run {
            Some(run) => LaunchPlan::Execute {
                build: commands.build.as_deref().map(|b| render(b, &vars)),
                run: render(run, &vars),
            },
            None => LaunchPlan::ManualReview { language },
        }
    }
}

/// Message written to the sink for submissions routed to manual review.
pub fn manual_review_message(language: Language) -> String {
    format!("Code implemented in {language}, Please check manually!")
}
