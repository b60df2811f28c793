use crate::cli::{AppsAction, DescribeArgs, PromptAction};
use crate::context::CliContext;
use crate::output;
use dashboard_assist::{generate_description, AppSearch};
use dashboard_domain::{AppDescription, BackgroundPrompt, IconPrompt};

pub fn handle_prompt(action: PromptAction) {
    let prompt = match action {
        PromptAction::Background {
            theme,
            lighting,
            details,
        } => BackgroundPrompt {
            theme,
            lighting,
            details,
        }
        .render(),
        PromptAction::Icon {
            emotion,
            background,
            color_theme,
            details,
        } => IconPrompt {
            emotion,
            background,
            color_theme,
            additional_details: details,
        }
        .render(),
    };
    output::output_success(serde_json::json!({"prompt": prompt}));
}

pub async fn handle_describe(ctx: &CliContext, args: DescribeArgs) -> anyhow::Result<()> {
    // Reject blank input before asking for credentials
    AppDescription::prompt(&args.app_name, &args.details)?;

    let generator = ctx.text_generator()?;
    let description = generate_description(&generator, &args.app_name, &args.details).await?;

    if let Some(path) = &args.output {
        let path = if path.is_dir() {
            path.join(AppDescription::download_file_name(&args.app_name))
        } else {
            path.clone()
        };
        tokio::fs::write(&path, description.render_download(&args.app_name)).await?;
        tracing::info!("Wrote description to {}", path.display());
    }

    output::output_success(&description);
    Ok(())
}

pub async fn handle_apps(ctx: &CliContext, action: AppsAction) -> anyhow::Result<()> {
    match action {
        AppsAction::Search { query } => {
            let client = ctx.app_search()?;
            let apps = client.search(query.as_deref().unwrap_or("")).await?;
            output::output_list(apps);
        }
    }
    Ok(())
}
