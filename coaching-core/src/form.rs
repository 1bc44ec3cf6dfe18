use crate::application::NewApplication;
use crate::error::FormError;

pub const DESCRIPTION_LABEL: &str = "Description";
pub const DESCRIPTION_PLACEHOLDER: &str =
    "What would you like your coach to know? E.g. feeling stuck in life";
pub const SUBMIT_LABEL: &str = "Register for coaching";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Empty,
    Editable,
    Submitting,
    Submitted,
}

#[derive(Clone, Debug, Default)]
pub struct SubmissionForm {
    state: FormState,
    draft: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormView {
    pub label: &'static str,
    pub placeholder: &'static str,
    pub draft: String,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub submitting: bool,
}

impl SubmissionForm {
    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn can_submit(&self) -> bool {
        self.state == FormState::Editable
    }

    /// Edits are dropped while a submission is in flight.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if self.state == FormState::Submitting {
            return;
        }
        self.draft = text.into();
        self.state = Self::state_for(&self.draft);
    }

    pub fn begin_submit(&mut self, identity: &str) -> Result<NewApplication, FormError> {
        match self.state {
            FormState::Submitting => return Err(FormError::Busy),
            FormState::Editable => {}
            FormState::Empty | FormState::Submitted => return Err(FormError::EmptyDraft),
        }
        self.state = FormState::Submitting;
        Ok(NewApplication {
            user: identity.to_string(),
            description: self.draft.clone(),
        })
    }

    /// Success clears the draft; failure keeps it for another attempt.
    pub fn finish_submit(&mut self, succeeded: bool) {
        if self.state != FormState::Submitting {
            return;
        }
        if succeeded {
            self.draft.clear();
            self.state = FormState::Submitted;
        } else {
            self.state = Self::state_for(&self.draft);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn render(&self) -> FormView {
        FormView {
            label: DESCRIPTION_LABEL,
            placeholder: DESCRIPTION_PLACEHOLDER,
            draft: self.draft.clone(),
            submit_label: SUBMIT_LABEL,
            submit_enabled: self.can_submit(),
            submitting: self.state == FormState::Submitting,
        }
    }

    fn state_for(draft: &str) -> FormState {
        if draft.is_empty() {
            FormState::Empty
        } else {
            FormState::Editable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_enabled_only_with_text() {
        let mut form = SubmissionForm::default();
        assert!(!form.can_submit());

        for text in ["a", " ", "feeling stuck", "ünïcode"] {
            form.set_draft(text);
            assert!(form.can_submit(), "{text:?} should enable submit");
        }

        form.set_draft("");
        assert_eq!(form.state(), FormState::Empty);
        assert!(!form.render().submit_enabled);
    }

    #[test]
    fn submit_cycle_clears_on_success() {
        let mut form = SubmissionForm::default();
        form.set_draft("feeling stuck");

        let new = form.begin_submit("Ada").expect("begin");
        assert_eq!(new.user, "Ada");
        assert_eq!(new.description, "feeling stuck");
        assert!(form.render().submitting);
        assert!(!form.render().submit_enabled);
        assert_eq!(form.begin_submit("Ada"), Err(FormError::Busy));

        form.set_draft("ignored while submitting");
        assert_eq!(form.draft(), "feeling stuck");

        form.finish_submit(true);
        assert_eq!(form.state(), FormState::Submitted);
        assert_eq!(form.draft(), "");
        assert_eq!(form.begin_submit("Ada"), Err(FormError::EmptyDraft));
    }

    #[test]
    fn failure_returns_to_editable() {
        let mut form = SubmissionForm::default();
        form.set_draft("retry me");
        form.begin_submit("Ada").expect("begin");
        form.finish_submit(false);

        assert_eq!(form.state(), FormState::Editable);
        assert_eq!(form.draft(), "retry me");
        assert!(form.can_submit());
    }
}
