use crate::cli::KeywordAction;
use crate::context::{fail_on_commit_error, CliContext, StdinConfirm};
use crate::output;
use dashboard_core::{AlwaysConfirm, Confirm};
use dashboard_domain::keyword::trends_url;
use dashboard_domain::Keyword;
use serde::Serialize;

#[derive(Serialize)]
struct KeywordView<'a> {
    #[serde(flatten)]
    keyword: &'a Keyword,
    trends_url: String,
}

pub async fn handle(ctx: &CliContext, action: KeywordAction) -> anyhow::Result<()> {
    if let KeywordAction::Trends { text } = &action {
        output::output_success(serde_json::json!({"text": text, "url": trends_url(text)}));
        return Ok(());
    }

    let mut keywords = ctx.keywords().await?;

    match action {
        KeywordAction::Add { text, category } => match keywords.add(&text, category).await? {
            Some(id) => {
                fail_on_commit_error(keywords.pending_commit_failure());
                output::output_success(serde_json::json!({"id": id}));
            }
            None => output::output_error("Keyword text must not be empty"),
        },
        KeywordAction::List { sort, category } => {
            let items: Vec<KeywordView> = keywords
                .list(sort.into(), category)
                .into_iter()
                .map(|keyword| KeywordView {
                    trends_url: keyword.trends_url(),
                    keyword,
                })
                .collect();
            output::output_list(items);
        }
        KeywordAction::Delete { id, yes } => {
            if keywords.find(&id).is_none() {
                output::output_error(&format!("Keyword not found: {}", id));
            }
            let confirm: &dyn Confirm = if yes { &AlwaysConfirm } else { &StdinConfirm };
            let deleted = keywords.delete(&id, confirm).await?;
            fail_on_commit_error(keywords.pending_commit_failure());
            output::output_success(serde_json::json!({"id": id, "deleted": deleted}));
        }
        KeywordAction::Trends { .. } => {}
    }

    keywords.unmount();
    Ok(())
}
