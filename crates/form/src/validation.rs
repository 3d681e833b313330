//! The validation pass.
//!
//! Each field is checked against a fixed sequence of rules and reports at
//! most one error: the first rule that fails. Required-ness comes first so
//! format rules never see an absent value. File rules come before the
//! custom predicate.

use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::Serialize;

use crate::field::{
    FieldDescriptor, FieldKind, FileRules, InputConstraints, InputType, TextareaOptions,
};
use crate::file::{file_matches_accept, parse_human_size};
use crate::values::{FormValues, SelectedFile, is_empty_value};

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const PATTERN_MISMATCH_MESSAGE: &str = "Please match the requested format";
pub const INVALID_OPTION_MESSAGE: &str = "Please select a valid option";

/// Field name → error message, in descriptor order.
///
/// A missing key means the field has no error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: IndexMap<String, String>,
}

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(name.into(), message.into());
    }

    /// Remove one field's error, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.errors.shift_remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.errors.contains_key(name)
    }

    /// The first erroring field, which is where focus should go.
    #[must_use]
    pub fn first(&self) -> Option<(&str, &str)> {
        self.errors
            .first()
            .map(|(name, message)| (name.as_str(), message.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Keep only entries whose name satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.errors.retain(|name, _| keep(name));
    }

    /// Sort entries to follow the order of `descriptors`.
    pub(crate) fn order_by(&mut self, descriptors: &[FieldDescriptor]) {
        let position = |name: &str| {
            descriptors
                .iter()
                .position(|d| d.name == name)
                .unwrap_or(usize::MAX)
        };
        self.errors
            .sort_by(|a, _, b, _| position(a).cmp(&position(b)));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            errors: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Validate every field and collect one message per failing field.
#[must_use]
pub fn validate(descriptors: &[FieldDescriptor], values: &FormValues) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for descriptor in descriptors {
        if let Some(message) = validate_field(descriptor, values) {
            errors.insert(descriptor.name.clone(), message);
        }
    }
    tracing::debug!(
        fields = descriptors.len(),
        errors = errors.len(),
        "validation pass complete"
    );
    errors
}

/// Validate a single field against the full value set.
#[must_use]
pub fn validate_field(descriptor: &FieldDescriptor, values: &FormValues) -> Option<String> {
    let value = values.get(&descriptor.name);

    if is_empty_value(value) {
        return descriptor
            .required
            .then(|| format!("{} is required", descriptor.display_label()));
    }
    let value = value?;

    let builtin = match &descriptor.kind {
        FieldKind::Input(constraints) => value
            .as_text()
            .and_then(|text| check_input(descriptor, constraints, text)),
        FieldKind::Textarea(options) => value
            .as_text()
            .and_then(|text| check_textarea(descriptor, options, text)),
        FieldKind::Select { options } => value.as_text().and_then(|text| {
            let known = options.is_empty() || options.iter().any(|o| o.value == text);
            (!known).then(|| INVALID_OPTION_MESSAGE.to_string())
        }),
        FieldKind::Checkbox => None,
        FieldKind::File(rules) => value.as_file().and_then(|file| check_file(rules, file)),
    };
    if builtin.is_some() {
        return builtin;
    }

    descriptor
        .validate
        .as_ref()
        .and_then(|rule| rule.check(value, values))
}

fn check_input(
    descriptor: &FieldDescriptor,
    constraints: &InputConstraints,
    text: &str,
) -> Option<String> {
    if constraints.input == InputType::Email && !EMAIL_REGEX.is_match(text) {
        return Some(INVALID_EMAIL_MESSAGE.to_string());
    }

    if let Some(min) = constraints.min_length
        && text.chars().count() < min
    {
        return Some(if constraints.input == InputType::Password {
            format!("Password must be at least {min} characters")
        } else {
            format!("{} must be at least {min} characters", descriptor.display_label())
        });
    }

    if let Some(pattern) = &constraints.pattern {
        match pattern.regex() {
            Ok(re) if !re.is_match(text) => return Some(PATTERN_MISMATCH_MESSAGE.to_string()),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(field = %descriptor.name, error = %e, "ignoring invalid pattern");
            }
        }
    }

    if constraints.input == InputType::Number {
        return check_number(descriptor, constraints, text);
    }
    None
}

fn check_number(
    descriptor: &FieldDescriptor,
    constraints: &InputConstraints,
    text: &str,
) -> Option<String> {
    let label = descriptor.display_label();
    let number = match text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => return Some(format!("{label} must be a number")),
    };
    if let Some(min) = constraints.min
        && number < min
    {
        return Some(format!("{label} must be at least {min}"));
    }
    if let Some(max) = constraints.max
        && number > max
    {
        return Some(format!("{label} must be at most {max}"));
    }
    None
}

fn check_textarea(
    descriptor: &FieldDescriptor,
    options: &TextareaOptions,
    text: &str,
) -> Option<String> {
    let count = text.chars().count();
    let label = descriptor.display_label();
    if let Some(min) = options.min_length
        && count < min
    {
        return Some(format!("{label} must be at least {min} characters"));
    }
    if let Some(max) = options.max_length
        && count > max
    {
        return Some(format!("{label} must be at most {max} characters"));
    }
    None
}

fn check_file(rules: &FileRules, file: &SelectedFile) -> Option<String> {
    if !rules.accept.is_empty() && !file_matches_accept(file, &rules.accept) {
        return Some(format!(
            "Please select a file of type: {}",
            rules.accept.join(", ")
        ));
    }

    if let Some(max_size) = &rules.max_size
        && let Some(limit) = parse_human_size(max_size)
        && file.size > limit
    {
        return Some(format!("File size should not exceed {max_size}"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn required_fires_on_empty_false_and_missing() {
        let fields = vec![
            FieldDescriptor::text("name").with_label("Full name").required(),
            FieldDescriptor::checkbox("agree").required(),
            FieldDescriptor::file("cv", [".pdf"]).with_label("CV").required(),
        ];
        let values = FormValues::new().with("name", "").with("agree", false);

        let errors = validate(&fields, &values);
        assert_eq!(errors.get("name"), Some("Full name is required"));
        assert_eq!(errors.get("agree"), Some("agree is required"));
        assert_eq!(errors.get("cv"), Some("CV is required"));
    }

    #[test]
    fn required_short_circuits_custom_rule() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let fields = vec![FieldDescriptor::email("email").required().with_validator(
            move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                Some("custom".into())
            },
        )];

        let errors = validate(&fields, &FormValues::new().with("email", ""));
        assert_eq!(errors.get("email"), Some("email is required"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn optional_empty_field_passes_everything() {
        let fields = vec![
            FieldDescriptor::email("email"),
            FieldDescriptor::password("pw").with_min_length(8),
            FieldDescriptor::text("code").with_validator(|_, _| Some("never".into())),
        ];
        assert!(validate(&fields, &FormValues::new()).is_empty());
    }

    #[test]
    fn invalid_email() {
        let fields = vec![FieldDescriptor::email("email").required()];
        let values = FormValues::new().with("email", "not-an-email");

        let errors = validate(&fields, &values);
        assert_eq!(
            errors,
            FieldErrors::from_iter([("email", "Please enter a valid email address")])
        );
    }

    #[test]
    fn valid_email_passes() {
        let fields = vec![FieldDescriptor::email("email").required()];
        let values = FormValues::new().with("email", "ada@uni.example");
        assert!(validate(&fields, &values).is_empty());
    }

    #[test]
    fn password_min_length() {
        let fields = vec![FieldDescriptor::password("password").with_min_length(8)];
        let values = FormValues::new().with("password", "short");
        assert_eq!(
            validate(&fields, &values).get("password"),
            Some("Password must be at least 8 characters")
        );

        let values = FormValues::new().with("password", "longenough");
        assert!(validate(&fields, &values).is_empty());
    }

    #[test]
    fn text_min_length_uses_label() {
        let fields = vec![
            FieldDescriptor::text("title")
                .with_label("Title")
                .with_min_length(5),
        ];
        let values = FormValues::new().with("title", "abc");
        assert_eq!(
            validate(&fields, &values).get("title"),
            Some("Title must be at least 5 characters")
        );
    }

    #[test]
    fn pattern_is_anchored() {
        let fields = vec![FieldDescriptor::text("id").with_pattern(r"[A-Z]{3}\d{2}")];
        let ok = FormValues::new().with("id", "ABC12");
        let bad = FormValues::new().with("id", "xxABC12yy");
        assert!(validate(&fields, &ok).is_empty());
        assert_eq!(
            validate(&fields, &bad).get("id"),
            Some(PATTERN_MISMATCH_MESSAGE)
        );
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let fields = vec![FieldDescriptor::text("id").with_pattern("(")];
        let values = FormValues::new().with("id", "anything");
        assert!(validate(&fields, &values).is_empty());
    }

    #[test]
    fn number_bounds() {
        let fields = vec![
            FieldDescriptor::number("age")
                .with_label("Age")
                .with_min(18.0)
                .with_max(99.0),
        ];
        let check = |v: &str| validate(&fields, &FormValues::new().with("age", v));

        assert_eq!(check("abc").get("age"), Some("Age must be a number"));
        assert_eq!(check("17").get("age"), Some("Age must be at least 18"));
        assert_eq!(check("100").get("age"), Some("Age must be at most 99"));
        assert!(check("42").is_empty());
    }

    #[test]
    fn unbounded_number_still_parses() {
        let fields = vec![FieldDescriptor::number("qty").with_label("Quantity")];
        let check = |v: &str| validate(&fields, &FormValues::new().with("qty", v));

        assert_eq!(check("abc").get("qty"), Some("Quantity must be a number"));
        assert!(check("12.5").is_empty());
        assert!(check("").is_empty());
    }

    #[test]
    fn textarea_length_bounds() {
        let fields = vec![
            FieldDescriptor::textarea("abstract")
                .with_label("Abstract")
                .with_min_length(3)
                .with_max_length(5),
        ];
        let check = |v: &str| validate(&fields, &FormValues::new().with("abstract", v));
        assert_eq!(
            check("ab").get("abstract"),
            Some("Abstract must be at least 3 characters")
        );
        assert_eq!(
            check("abcdef").get("abstract"),
            Some("Abstract must be at most 5 characters")
        );
        assert!(check("abcd").is_empty());
    }

    #[test]
    fn select_rejects_unknown_option() {
        let fields = vec![FieldDescriptor::select(
            "dept",
            [("cs", "Computer Science"), ("ee", "Electrical")],
        )];
        let ok = FormValues::new().with("dept", "cs");
        let bad = FormValues::new().with("dept", "law");
        assert!(validate(&fields, &ok).is_empty());
        assert_eq!(validate(&fields, &bad).get("dept"), Some(INVALID_OPTION_MESSAGE));
    }

    #[test]
    fn file_type_checked_before_size() {
        let fields = vec![
            FieldDescriptor::file("thesis", [".pdf", "application/pdf"]).with_max_size("1KB"),
        ];
        let values = FormValues::new().with(
            "thesis",
            SelectedFile::new("big.docx", 5000, "application/msword"),
        );

        assert_eq!(
            validate(&fields, &values).get("thesis"),
            Some("Please select a file of type: .pdf, application/pdf")
        );
    }

    #[test]
    fn file_max_size() {
        let fields = vec![FieldDescriptor::file("thesis", [".pdf"]).with_max_size("1KB")];
        let values =
            FormValues::new().with("thesis", SelectedFile::new("t.pdf", 1025, "application/pdf"));
        assert_eq!(
            validate(&fields, &values).get("thesis"),
            Some("File size should not exceed 1KB")
        );

        let values =
            FormValues::new().with("thesis", SelectedFile::new("t.pdf", 1024, "application/pdf"));
        assert!(validate(&fields, &values).is_empty());
    }

    #[test]
    fn unparseable_max_size_is_no_limit() {
        let fields = vec![FieldDescriptor::file("doc", Vec::<String>::new()).with_max_size("huge")];
        let values = FormValues::new().with("doc", SelectedFile::new("d.bin", u64::MAX, ""));
        assert!(validate(&fields, &values).is_empty());
    }

    #[test]
    fn custom_rule_sees_all_values() {
        let fields = vec![
            FieldDescriptor::password("password"),
            FieldDescriptor::password("confirm").with_validator(|value, all| {
                (value.as_text() != all.get_text("password"))
                    .then(|| "Passwords do not match".to_string())
            }),
        ];
        let values = FormValues::new()
            .with("password", "hunter22")
            .with("confirm", "hunter23");
        assert_eq!(
            validate(&fields, &values).get("confirm"),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn custom_rule_not_reached_when_builtin_fails() {
        let fields = vec![
            FieldDescriptor::file("img", ["image/*"])
                .with_validator(|_, _| Some("custom saw the file".into())),
        ];
        let values = FormValues::new().with("img", SelectedFile::new("a.txt", 1, "text/plain"));
        assert_eq!(
            validate(&fields, &values).get("img"),
            Some("Please select a file of type: image/*")
        );
    }

    #[test]
    fn errors_follow_descriptor_order() {
        let fields = vec![
            FieldDescriptor::text("zeta").required(),
            FieldDescriptor::text("alpha").required(),
        ];
        let errors = validate(&fields, &FormValues::new());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().map(|(n, _)| n), Some("zeta"));
        assert_eq!(errors.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn order_by_reorders_foreign_maps() {
        let fields = vec![FieldDescriptor::text("b"), FieldDescriptor::text("a")];
        let mut errors = FieldErrors::from_iter([("a", "x"), ("b", "y")]);
        errors.order_by(&fields);
        assert_eq!(errors.first(), Some(("b", "y")));
    }
}
