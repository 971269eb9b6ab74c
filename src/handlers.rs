use crate::commands::{summary_edit, CommandContext, SHOW_TODAY_BUTTON};
use crate::error::{BotResult, Error};
use poise::serenity_prelude as serenity;
use tracing::{debug, error};

/// Gateway events poise does not route to a command
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, CommandContext, Error>,
    data: &CommandContext,
) -> Result<(), Error> {
    if let serenity::FullEvent::InteractionCreate { interaction } = event {
        if let Some(component) = interaction.as_message_component() {
            match component.data.custom_id.as_str() {
                SHOW_TODAY_BUTTON => handle_show_today(ctx, component, data).await?,
                other => debug!("Ignoring component interaction {}", other),
            }
        }
    }
    Ok(())
}

/// Button callback: acknowledge, then edit the pressed message with today's classes
async fn handle_show_today(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &CommandContext,
) -> BotResult<()> {
    component
        .create_response(&ctx.http, serenity::CreateInteractionResponse::Acknowledge)
        .await?;

    match data.summary.build_today_summary().await {
        Ok(summary) => {
            component
                .edit_response(&ctx.http, summary_edit(&summary))
                .await?;
        }
        Err(e) => {
            error!("Failed to build today's summary: {:?}", e);
            component
                .create_followup(
                    &ctx.http,
                    serenity::CreateInteractionResponseFollowup::new()
                        .content(e.user_message())
                        .ephemeral(true),
                )
                .await?;
        }
    }

    Ok(())
}
