use crate::components::google_calendar::{DaySummary, SummaryBuilder};
use crate::config::Config;
use crate::error::BotResult;
use poise::serenity_prelude as serenity;
use rust_i18n::t;
use std::sync::Arc;
use tracing::error;

// Export submodules
pub mod calendar;
pub mod start;

/// Custom id of the "show today" button
pub const SHOW_TODAY_BUTTON: &str = "show_today";

/// Embed colour used for schedule replies
const SUMMARY_COLOR: u32 = 0x00_99_FF;

/// Shared context for all commands
pub struct CommandContext {
    pub config: Arc<Config>,
    pub summary: Arc<SummaryBuilder>,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: Arc<Config>, summary: Arc<SummaryBuilder>) -> Self {
        Self { config, summary }
    }
}

/// Type alias for command result
pub type CommandResult = BotResult<()>;

/// Type alias for poise context
pub type Context<'a> = poise::Context<'a, CommandContext, crate::error::Error>;

/// All application commands
pub fn get_all_application_commands() -> Vec<poise::Command<CommandContext, crate::error::Error>> {
    vec![start::start(), calendar::today()]
}

/// Row holding the "show today" button
pub fn show_today_row() -> serenity::CreateActionRow {
    serenity::CreateActionRow::Buttons(vec![serenity::CreateButton::new(SHOW_TODAY_BUTTON)
        .label(t!("button_show_today"))
        .style(serenity::ButtonStyle::Primary)])
}

/// Embed carrying a rendered schedule
pub fn create_summary_embed(text: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .description(text)
        .color(SUMMARY_COLOR)
}

/// Reply for a slash or prefix command
pub fn summary_reply(result: BotResult<DaySummary>) -> poise::CreateReply {
    match result {
        Ok(summary) => {
            let text = summary.render();
            let reply = if summary.is_rich() {
                poise::CreateReply::default().embed(create_summary_embed(&text))
            } else {
                poise::CreateReply::default().content(text)
            };
            reply.components(vec![show_today_row()])
        }
        Err(e) => {
            error!("Failed to build today's summary: {:?}", e);
            poise::CreateReply::default()
                .content(e.user_message())
                .ephemeral(true)
        }
    }
}

/// In-place edit of the message whose button was pressed
pub fn summary_edit(summary: &DaySummary) -> serenity::EditInteractionResponse {
    let text = summary.render();
    let edit = if summary.is_rich() {
        serenity::EditInteractionResponse::new()
            .content("")
            .embeds(vec![create_summary_embed(&text)])
    } else {
        serenity::EditInteractionResponse::new()
            .content(text)
            .embeds(vec![])
    };
    edit.components(vec![show_today_row()])
}
