use crate::error::{FieldError, FormField, ValidationErrors};
use crate::task::{TaskCreate, TaskStatus, TaskUpdate};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Raw input from the add/edit modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
}

/// Form input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub title: String,
    pub description: Option<String>,
}

impl TaskForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidTask, ValidationErrors> {
        let mut errors = Vec::new();

        let title_chars = self.title.chars().count();
        if title_chars == 0 {
            errors.push(FieldError {
                field: FormField::Title,
                message: "Title is required".to_string(),
            });
        } else if title_chars > TITLE_MAX_CHARS {
            errors.push(FieldError {
                field: FormField::Title,
                message: format!("Title must be {TITLE_MAX_CHARS} characters or less"),
            });
        }

        if self.description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.push(FieldError {
                field: FormField::Description,
                message: format!("Description must be {DESCRIPTION_MAX_CHARS} characters or less"),
            });
        }

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        Ok(ValidTask {
            title: self.title.clone(),
            description: (!self.description.is_empty()).then(|| self.description.clone()),
        })
    }
}

impl ValidTask {
    pub fn into_create(self, status: TaskStatus) -> TaskCreate {
        TaskCreate {
            title: self.title,
            description: self.description,
            status,
        }
    }

    pub fn into_update(self) -> TaskUpdate {
        TaskUpdate {
            title: Some(self.title),
            description: Some(self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_title_is_rejected() {
        let errors = TaskForm::new("", "details").validate().unwrap_err();
        assert_eq!(errors.for_field(FormField::Title), Some("Title is required"));
        assert_eq!(errors.for_field(FormField::Description), None);
    }

    #[rstest]
    #[case(1, true)]
    #[case(100, true)]
    #[case(101, false)]
    fn title_length_limit(#[case] len: usize, #[case] ok: bool) {
        let form = TaskForm::new("x".repeat(len), "");
        assert_eq!(form.validate().is_ok(), ok);
    }

    #[rstest]
    #[case(500, true)]
    #[case(501, false)]
    fn description_length_limit(#[case] len: usize, #[case] ok: bool) {
        let form = TaskForm::new("title", "d".repeat(len));
        assert_eq!(form.validate().is_ok(), ok);
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let form = TaskForm::new("é".repeat(100), "");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn both_fields_reported_together() {
        let errors = TaskForm::new("", "d".repeat(501)).validate().unwrap_err();
        assert_eq!(errors.0.len(), 2);
    }

    #[test]
    fn empty_description_becomes_none() {
        let valid = TaskForm::new("Title", "").validate().unwrap();
        assert_eq!(valid.description, None);

        let create = valid.into_create(TaskStatus::Done);
        assert_eq!(create.status, TaskStatus::Done);
    }
}
