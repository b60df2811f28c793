use crate::cli::NoteAction;
use crate::context::{fail_on_commit_error, CliContext, StdinConfirm};
use crate::output;
use dashboard_core::{AlwaysConfirm, Confirm};
use serde::Serialize;

#[derive(Serialize)]
struct NoteView<'a> {
    #[serde(flatten)]
    note: &'a dashboard_domain::Note,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    links: Vec<&'a str>,
}

pub async fn handle(ctx: &CliContext, action: NoteAction) -> anyhow::Result<()> {
    let mut notes = ctx.notes().await?;

    match action {
        NoteAction::Add { content, category } => match notes.add(&content, category).await? {
            Some(id) => {
                fail_on_commit_error(notes.pending_commit_failure());
                output::output_success(serde_json::json!({"id": id}));
            }
            None => output::output_error("Note content must not be empty"),
        },
        NoteAction::List { category } => {
            let items: Vec<NoteView> = notes
                .list(category)
                .into_iter()
                .map(|note| NoteView {
                    links: note.links(),
                    note,
                })
                .collect();
            output::output_list(items);
        }
        NoteAction::Edit { id, content } => {
            if !notes.edit(&id, &content).await? {
                output::output_error(&format!("Note not found or content empty: {}", id));
            }
            fail_on_commit_error(notes.pending_commit_failure());
            output::output_success(serde_json::json!({"id": id, "edited": true}));
        }
        NoteAction::Delete { id, yes } => {
            if notes.book().and_then(|b| b.find(&id)).is_none() {
                output::output_error(&format!("Note not found: {}", id));
            }
            let confirm: &dyn Confirm = if yes { &AlwaysConfirm } else { &StdinConfirm };
            let deleted = notes.delete(&id, confirm).await?;
            fail_on_commit_error(notes.pending_commit_failure());
            output::output_success(serde_json::json!({"id": id, "deleted": deleted}));
        }
    }

    notes.unmount();
    Ok(())
}
