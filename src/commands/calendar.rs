use crate::commands::{summary_reply, CommandResult, Context};
use tracing::debug;

/// Show the classes on today's calendar
#[poise::command(
    slash_command,
    prefix_command,
    aliases("hoy"),
    name_localized("es-ES", "hoy"),
    name_localized("es-419", "hoy"),
    description_localized("es-ES", "Muestra las clases de hoy"),
    description_localized("es-419", "Muestra las clases de hoy")
)]
pub async fn today(ctx: Context<'_>) -> CommandResult {
    // Google can take longer than the interaction deadline
    ctx.defer().await?;
    debug!(
        "Building today's summary from calendar {}",
        ctx.data().config.google_calendar_id
    );

    let result = ctx.data().summary.build_today_summary().await;
    ctx.send(summary_reply(result)).await?;
    Ok(())
}
