/// Asks the user to approve an irreversible action.
/// Returning `false` aborts the action without error.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves every prompt. Used for `--yes` and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
