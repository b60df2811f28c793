use crate::cli::BoardAction;
use crate::context::{fail_on_commit_error, CliContext, StdinConfirm};
use crate::output;
use dashboard_core::{AlwaysConfirm, Confirm, CountdownLocale};
use dashboard_domain::{now_millis, remaining_time_label, BoardDocument, ColumnKey};
use dashboard_sync::{BoardEvent, BoardReconciler};
use serde::Serialize;

#[derive(Serialize)]
pub struct TaskView {
    pub id: String,
    pub content: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
    /// Countdown, shown for in-progress tasks only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
}

#[derive(Serialize)]
pub struct ColumnView {
    pub id: ColumnKey,
    pub title: String,
    pub tasks: Vec<TaskView>,
}

#[derive(Serialize)]
pub struct BoardView {
    pub user_id: String,
    pub columns: Vec<ColumnView>,
    pub active_timers: usize,
}

impl BoardView {
    fn render(board: &BoardDocument, active_timers: usize, locale: CountdownLocale) -> Self {
        let now_ms = now_millis();
        let columns = board
            .columns()
            .map(|column| ColumnView {
                id: column.id,
                title: column.title.clone(),
                tasks: column
                    .tasks
                    .iter()
                    .map(|task| TaskView {
                        id: task.id.clone(),
                        content: task.content.clone(),
                        completed: task.completed,
                        deadline: task.deadline,
                        remaining: task
                            .deadline
                            .filter(|_| column.id == ColumnKey::InProgress)
                            .map(|deadline| remaining_time_label(deadline, now_ms, locale)),
                    })
                    .collect(),
            })
            .collect();
        Self {
            user_id: board.owner_id.clone(),
            columns,
            active_timers,
        }
    }
}

#[derive(Serialize)]
struct TickView<'a> {
    tick: &'a str,
    remaining: Option<String>,
}

fn show(board: &BoardReconciler, locale: CountdownLocale) {
    match board.board() {
        Some(doc) => output::output_success(BoardView::render(
            doc,
            board.timers().active_count(),
            locale,
        )),
        None => output::output_error("Board is not mounted"),
    }
}

pub async fn handle(ctx: &CliContext, action: BoardAction) -> anyhow::Result<()> {
    if let BoardAction::Watch = action {
        return watch(ctx).await;
    }

    let mut board = ctx.board().await?;
    let locale = ctx.locale();

    match action {
        BoardAction::Show => show(&board, locale),
        BoardAction::Add { content, days } => {
            match board.add_task(&content, days).await? {
                Some(id) => {
                    fail_on_commit_error(board.pending_commit_failure());
                    output::output_success(serde_json::json!({"id": id}));
                }
                None => output::output_error("Task content must not be empty"),
            }
        }
        BoardAction::Move { id, from, to } => {
            if !board.move_task(&id, from, to).await? {
                output::output_error(&format!("Task {} is not in {}", id, from));
            }
            fail_on_commit_error(board.pending_commit_failure());
            show(&board, locale);
        }
        BoardAction::Advance { id } => {
            ensure_exists(&board, &id);
            let moved = board.advance(&id).await?;
            fail_on_commit_error(board.pending_commit_failure());
            output::output_success(serde_json::json!({
                "id": id,
                "moved": moved,
                "column": board.board().and_then(|b| b.locate(&id)),
            }));
        }
        BoardAction::Toggle { id } => {
            ensure_exists(&board, &id);
            board.toggle_done(&id).await?;
            fail_on_commit_error(board.pending_commit_failure());
            output::output_success(serde_json::json!({
                "id": id,
                "column": board.board().and_then(|b| b.locate(&id)),
            }));
        }
        BoardAction::Delete { id, column, yes } => {
            let column = match column.or_else(|| board.board().and_then(|b| b.locate(&id))) {
                Some(column) => column,
                None => output::output_error(&format!("Task not found: {}", id)),
            };
            let confirm: &dyn Confirm = if yes { &AlwaysConfirm } else { &StdinConfirm };
            let deleted = board.delete_task(column, &id, confirm).await?;
            fail_on_commit_error(board.pending_commit_failure());
            output::output_success(serde_json::json!({"id": id, "deleted": deleted}));
        }
        BoardAction::Watch => {}
    }

    board.unmount();
    Ok(())
}

fn ensure_exists(board: &BoardReconciler, id: &str) {
    let found = board.board().is_some_and(|b| b.contains_task(id));
    if !found {
        output::output_error(&format!("Task not found: {}", id));
    }
}

/// One JSON line per remote change or countdown tick, until ctrl-c.
async fn watch(ctx: &CliContext) -> anyhow::Result<()> {
    let mut board = ctx.watched_board().await?;
    let locale = ctx.locale();
    show(&board, locale);

    loop {
        let event = tokio::select! {
            event = board.next_event() => event,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, leaving watch");
                None
            }
        };

        match event {
            Some(BoardEvent::Emission) => show(&board, locale),
            Some(BoardEvent::Tick(tick)) => {
                output::output_success(TickView {
                    tick: &tick.task_id,
                    remaining: board.remaining_label(&tick.task_id, locale),
                });
            }
            None => break,
        }
    }

    board.unmount();
    Ok(())
}
