//! Property-based tests for the form engine.

use intake_form::file::parse_human_size;
use intake_form::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Mutation {
    Text(usize, String),
    Check(bool),
    Pick(u64),
    Clear,
    Errors(Vec<usize>),
}

const TEXT_FIELDS: [&str; 3] = ["name", "email", "bio"];

fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name").required(),
        FieldDescriptor::email("email"),
        FieldDescriptor::textarea("bio").with_max_length(40),
        FieldDescriptor::checkbox("terms"),
        FieldDescriptor::file("cv", [".pdf"]),
    ]
}

fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        (0..TEXT_FIELDS.len(), ".{0,20}").prop_map(|(i, s)| Mutation::Text(i, s)),
        any::<bool>().prop_map(Mutation::Check),
        (0u64..20 * 1024 * 1024).prop_map(Mutation::Pick),
        Just(Mutation::Clear),
        prop::collection::vec(0..TEXT_FIELDS.len(), 0..3).prop_map(Mutation::Errors),
    ]
}

fn apply(state: &mut FormState, mutation: Mutation) {
    match mutation {
        Mutation::Text(i, text) => state.set_value(TEXT_FIELDS[i], text).unwrap(),
        Mutation::Check(checked) => state.set_value("terms", checked).unwrap(),
        Mutation::Pick(size) => state
            .set_file("cv", SelectedFile::new("cv.pdf", size, "application/pdf"))
            .unwrap(),
        Mutation::Clear => state.clear_file("cv").unwrap(),
        Mutation::Errors(picks) => state.set_errors(
            picks
                .into_iter()
                .map(|i| (TEXT_FIELDS[i], "invalid"))
                .collect(),
        ),
    }
}

// ============================================================================
// RESET: any mutation sequence is undone by reset()
// ============================================================================

proptest! {
    #[test]
    fn reset_restores_snapshot(
        name in ".{0,10}",
        terms in any::<bool>(),
        mutations in prop::collection::vec(mutation(), 0..24),
    ) {
        let initial = FormValues::new().with("name", name).with("terms", terms);
        let mut state = FormState::from_descriptors(fields(), initial).unwrap();
        let snapshot = state.values().clone();

        for m in mutations {
            apply(&mut state, m);
        }
        state.reset();

        prop_assert_eq!(state.values(), &snapshot);
        prop_assert!(state.errors().is_empty());
        prop_assert!(state.file_display("cv").is_none());
    }

    #[test]
    fn display_tracks_file_value(mutations in prop::collection::vec(mutation(), 0..24)) {
        let mut state = FormState::from_descriptors(fields(), FormValues::new()).unwrap();
        for m in mutations {
            apply(&mut state, m);
            let has_file = state.values().get_file("cv").is_some();
            prop_assert_eq!(state.file_display("cv").is_some(), has_file);
        }
    }
}

// ============================================================================
// ERROR CLEARING: set_value clears only the touched field
// ============================================================================

proptest! {
    #[test]
    fn set_value_clears_only_its_field(target in 0..TEXT_FIELDS.len(), text in ".{0,12}") {
        let mut state = FormState::from_descriptors(fields(), FormValues::new()).unwrap();
        state.set_errors(TEXT_FIELDS.iter().map(|n| (*n, "invalid")).collect());

        state.set_value(TEXT_FIELDS[target], text).unwrap();

        for (i, name) in TEXT_FIELDS.iter().enumerate() {
            prop_assert_eq!(state.error(name).is_some(), i != target);
        }
    }

    #[test]
    fn oversized_files_never_stored(extra in 1u64..1024 * 1024 * 1024) {
        let mut state = FormState::from_descriptors(fields(), FormValues::new()).unwrap();
        let size = state.hard_cap() + extra;

        state.set_file("cv", SelectedFile::new("cv.pdf", size, "application/pdf")).unwrap();

        prop_assert!(state.value("cv").is_none());
        prop_assert!(state.error("cv").is_some());
    }
}

// ============================================================================
// SIZES: unit suffixes scale by powers of 1024
// ============================================================================

proptest! {
    #[test]
    fn unit_suffix_scales(n in 0u64..4096, unit in 0usize..3, lower in any::<bool>()) {
        let units = [("KB", 1024u64), ("MB", 1024 * 1024), ("GB", 1024 * 1024 * 1024)];
        let (suffix, factor) = units[unit];
        let suffix = if lower { suffix.to_lowercase() } else { suffix.to_owned() };

        prop_assert_eq!(parse_human_size(&format!("{n}{suffix}")), Some(n * factor));
        prop_assert_eq!(parse_human_size(&n.to_string()), Some(n));
    }

    #[test]
    fn required_empty_always_reports_required(label in "[A-Za-z]{1,12}") {
        let field = FieldDescriptor::email("f")
            .with_label(label.clone())
            .with_min_length(3)
            .required();
        let message = intake_form::validation::validate_field(&field, &FormValues::new());
        prop_assert_eq!(message, Some(format!("{label} is required")));
    }
}
