use crate::commands::{show_today_row, CommandResult, Context};
use rust_i18n::t;

/// Say hello and offer the "today's classes" button
#[poise::command(slash_command, prefix_command)]
pub async fn start(ctx: Context<'_>) -> CommandResult {
    ctx.send(
        poise::CreateReply::default()
            .content(t!("greeting"))
            .components(vec![show_today_row()]),
    )
    .await?;
    Ok(())
}
