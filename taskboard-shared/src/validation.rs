/// Task payload validation
///
/// Task payloads arrive as loosely typed JSON. Every field is kept as a raw
/// [`serde_json::Value`] so that a wrong type on one field does not abort
/// deserialization of the whole body; instead each field is checked
/// independently and all violations are returned together.
///
/// Two modes are supported:
///
/// - [`validate_new_task`]: creation, `title` is required
/// - [`validate_task_changes`]: partial update, only supplied fields are checked
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use taskboard_shared::validation::{validate_new_task, TaskPayload};
///
/// let payload: TaskPayload = serde_json::from_value(json!({
///     "title": "   ",
///     "priority": "urgent",
///     "due_date": "2024-02-30"
/// })).unwrap();
///
/// let errors = validate_new_task(&payload).unwrap_err();
/// assert_eq!(errors.len(), 3);
/// ```

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::task::{NewTask, Priority, TaskChanges, TaskFilter};

/// A single violated field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Raw task payload as sent by clients
///
/// `None` means the field was absent; `Some(Value::Null)` means it was sent
/// as an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    pub completed: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    pub priority: Option<Value>,

    #[serde(default, alias = "dueDate", deserialize_with = "present")]
    pub due_date: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Parses a strict `YYYY-MM-DD` calendar date
///
/// The string must have exactly four year digits, two month digits and two
/// day digits, and must name a real day (`2024-02-30` is rejected).
///
/// ```
/// use taskboard_shared::validation::parse_due_date;
///
/// assert!(parse_due_date("2024-02-29").is_some());
/// assert!(parse_due_date("2023-02-29").is_none());
/// assert!(parse_due_date("2024-2-9").is_none());
/// ```
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 {
        return None;
    }

    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Text fields are stored in PostgreSQL `TEXT` columns, which cannot hold NUL
fn has_nul(value: &str) -> bool {
    value.contains('\0')
}

/// `validator` rule rejecting strings that contain a NUL character
pub fn no_nul_chars(value: &str) -> Result<(), validator::ValidationError> {
    if has_nul(value) {
        let mut err = validator::ValidationError::new("nul_character");
        err.message = Some(Cow::Borrowed("Must not contain NUL characters"));
        return Err(err);
    }
    Ok(())
}

const TITLE_REQUIRED: &str = "Title is required and must not be blank";
const TITLE_INVALID: &str = "Title, if provided, must be a non-blank string";
const TITLE_NUL: &str = "Title must not contain NUL characters";
const DESCRIPTION_INVALID: &str = "Description must be a string";
const DESCRIPTION_NUL: &str = "Description must not contain NUL characters";
const COMPLETED_INVALID: &str = "Completed must be a boolean";
const PRIORITY_INVALID: &str = "Priority must be one of: low, medium, high";
const DUE_DATE_INVALID: &str = "Due date must be a valid date in YYYY-MM-DD format";

/// Accumulates field errors while extracting typed values
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    fn title(&mut self, value: &Value, message: &str) -> Option<String> {
        match value.as_str().map(str::trim) {
            Some(title) if has_nul(title) => {
                self.fail("title", TITLE_NUL);
                None
            }
            Some(title) if !title.is_empty() => Some(title.to_string()),
            _ => {
                self.fail("title", message);
                None
            }
        }
    }

    fn description(&mut self, value: &Value) -> Option<String> {
        match value.as_str() {
            Some(description) if has_nul(description) => {
                self.fail("description", DESCRIPTION_NUL);
                None
            }
            Some(description) => Some(description.trim().to_string()),
            None => {
                self.fail("description", DESCRIPTION_INVALID);
                None
            }
        }
    }

    fn completed(&mut self, value: &Value) -> Option<bool> {
        match value.as_bool() {
            Some(completed) => Some(completed),
            None => {
                self.fail("completed", COMPLETED_INVALID);
                None
            }
        }
    }

    fn priority(&mut self, value: &Value) -> Option<Priority> {
        match value.as_str().and_then(Priority::parse) {
            Some(priority) => Some(priority),
            None => {
                self.fail("priority", PRIORITY_INVALID);
                None
            }
        }
    }

    /// `null` clears the date; anything else must be a strict date string
    fn due_date(&mut self, value: &Value) -> Option<Option<NaiveDate>> {
        if value.is_null() {
            return Some(None);
        }
        match value.as_str().and_then(parse_due_date) {
            Some(date) => Some(Some(date)),
            None => {
                self.fail("due_date", DUE_DATE_INVALID);
                None
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

/// Validates a creation payload
///
/// On success returns a [`NewTask`] with defaults applied: empty
/// description, `completed = false`, `priority = medium`, no due date.
pub fn validate_new_task(payload: &TaskPayload) -> Result<NewTask, Vec<FieldError>> {
    let mut check = Checker::default();

    let title = match &payload.title {
        Some(value) => check.title(value, TITLE_REQUIRED),
        None => {
            check.fail("title", TITLE_REQUIRED);
            None
        }
    };
    let description = payload.description.as_ref().and_then(|v| check.description(v));
    let completed = payload.completed.as_ref().and_then(|v| check.completed(v));
    let priority = payload.priority.as_ref().and_then(|v| check.priority(v));
    let due_date = payload.due_date.as_ref().and_then(|v| check.due_date(v));

    check.finish(NewTask {
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        completed: completed.unwrap_or(false),
        priority: priority.unwrap_or_default(),
        due_date: due_date.flatten(),
    })
}

/// Validates a partial update payload
///
/// Only fields present in the payload are checked and carried into the
/// returned [`TaskChanges`]; absent fields stay `None` and are left untouched
/// by the store.
pub fn validate_task_changes(payload: &TaskPayload) -> Result<TaskChanges, Vec<FieldError>> {
    let mut check = Checker::default();

    let changes = TaskChanges {
        title: payload.title.as_ref().and_then(|v| check.title(v, TITLE_INVALID)),
        description: payload.description.as_ref().and_then(|v| check.description(v)),
        completed: payload.completed.as_ref().and_then(|v| check.completed(v)),
        priority: payload.priority.as_ref().and_then(|v| check.priority(v)),
        due_date: payload.due_date.as_ref().and_then(|v| check.due_date(v)),
    };

    check.finish(changes)
}

/// Raw list filters as they appear in the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<String>,

    pub priority: Option<String>,

    #[serde(alias = "dueDate")]
    pub due_date: Option<String>,
}

impl TaskQuery {
    /// Converts the raw filters into a typed [`TaskFilter`]
    ///
    /// `completed` must be `true` or `false` (case-insensitive). Empty
    /// `priority` and `due_date` values are treated as absent; non-empty
    /// malformed values are errors rather than being ignored.
    pub fn into_filter(self) -> Result<TaskFilter, Vec<FieldError>> {
        let mut check = Checker::default();

        let completed = match self.completed.as_deref().map(str::to_ascii_lowercase) {
            None => None,
            Some(value) if value == "true" => Some(true),
            Some(value) if value == "false" => Some(false),
            Some(_) => {
                check.fail("completed", "The completed filter must be true or false");
                None
            }
        };

        let priority = match self.priority.as_deref().filter(|p| !p.is_empty()) {
            None => None,
            Some(value) => Priority::parse(value).or_else(|| {
                check.fail("priority", PRIORITY_INVALID);
                None
            }),
        };

        let due_date = match self.due_date.as_deref().filter(|d| !d.is_empty()) {
            None => None,
            Some(value) => parse_due_date(value).or_else(|| {
                check.fail("due_date", DUE_DATE_INVALID);
                None
            }),
        };

        check.finish(TaskFilter {
            owner: None,
            completed,
            priority,
            due_date,
        })
    }
}
