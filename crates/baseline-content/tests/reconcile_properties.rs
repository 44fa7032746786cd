use baseline_content::{
    DesiredState, Dialect, Document, FlatDialect, Intent, Separator, SpaceDialect, TaggedDialect,
    Value,
};
use proptest::prelude::*;

const MANAGED: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

fn line_strategy(sep: Separator) -> impl Strategy<Value = String> {
    let key = prop::sample::select(vec!["alpha", "beta", "gamma", "delta", "other", "misc"]);
    let value = prop::sample::select(vec!["1", "2", "yes", "no"]);
    prop_oneof![
        3 => (key, value).prop_map(move |(k, v)| sep.format(k, v)),
        1 => Just("# a comment".to_string()),
        1 => Just(String::new()),
    ]
}

fn document_strategy(sep: Separator) -> impl Strategy<Value = String> {
    prop::collection::vec(line_strategy(sep), 0..12).prop_map(|lines| {
        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    })
}

fn desired_strategy() -> impl Strategy<Value = DesiredState> {
    prop::collection::vec(
        (
            prop::sample::select(MANAGED.to_vec()),
            prop::sample::select(vec!["1", "2", "yes", "no"]),
        ),
        1..4,
    )
    .prop_map(|pairs| pairs.into_iter().map(|(k, v)| (k, Value::scalar(v))).collect())
}

fn repeatable_strategy() -> impl Strategy<Value = DesiredState> {
    (
        prop::sample::select(MANAGED.to_vec()),
        prop::collection::btree_set(prop::sample::select(vec!["1", "2", "yes", "no"]), 1..4),
    )
        .prop_map(|(k, items)| DesiredState::new().with(k, Value::repeatable(items)))
}

/// Lines that do not carry any desired key.
fn untouched_lines(doc: &Document, sep: Separator, desired: &DesiredState) -> Vec<String> {
    doc.lines()
        .iter()
        .filter(|l| match sep.split(l) {
            Some((k, _)) => !desired.contains_key(k),
            None => true,
        })
        .map(|l| l.raw().to_string())
        .collect()
}

fn is_subsequence(needle: &[String], haystack: &[String]) -> bool {
    let mut it = haystack.iter();
    needle.iter().all(|n| it.any(|h| h == n))
}

fn check_idempotent(
    dialect: &dyn Dialect,
    text: &str,
    desired: &DesiredState,
    intent: Intent,
) -> Result<(), TestCaseError> {
    let doc = Document::parse(text);
    let result = dialect.validate(&doc, desired, intent).unwrap();
    let once = dialect.update(&doc, &result).unwrap();

    let again = dialect.validate(&once, desired, intent).unwrap();
    prop_assert!(again.compliant, "not compliant after update:\n{}", once.render());

    let twice = dialect.update(&once, &again).unwrap();
    prop_assert_eq!(twice.render(), once.render());
    Ok(())
}

proptest! {
    #[test]
    fn flat_update_is_idempotent(text in document_strategy(Separator::OpenEq), desired in desired_strategy()) {
        check_idempotent(&FlatDialect::open(), &text, &desired, Intent::Present)?;
        check_idempotent(&FlatDialect::open(), &text, &desired, Intent::Absent)?;
    }

    #[test]
    fn space_update_is_idempotent(text in document_strategy(Separator::Space), desired in desired_strategy()) {
        check_idempotent(&SpaceDialect, &text, &desired, Intent::Present)?;
        check_idempotent(&SpaceDialect, &text, &desired, Intent::Absent)?;
    }

    #[test]
    fn space_repeatable_is_idempotent(text in document_strategy(Separator::Space), desired in repeatable_strategy()) {
        check_idempotent(&SpaceDialect, &text, &desired, Intent::Present)?;
        check_idempotent(&SpaceDialect, &text, &desired, Intent::Absent)?;
    }

    #[test]
    fn tagged_update_is_idempotent(
        before in document_strategy(Separator::OpenEq),
        body in document_strategy(Separator::OpenEq),
        with_section in any::<bool>(),
        desired in desired_strategy(),
    ) {
        let text = if with_section { format!("{before}[main]\n{body}[tail]\nx = 1\n") } else { before };
        let dialect = TaggedDialect::new("main", Separator::OpenEq);
        check_idempotent(&dialect, &text, &desired, Intent::Present)?;
        check_idempotent(&dialect, &text, &desired, Intent::Absent)?;
    }

    #[test]
    fn flat_update_preserves_unrelated_lines(text in document_strategy(Separator::ClosedEq), desired in desired_strategy()) {
        let dialect = FlatDialect::closed();
        let doc = Document::parse(&text);
        let result = dialect.validate(&doc, &desired, Intent::Present).unwrap();
        let updated = dialect.update(&doc, &result).unwrap();

        let kept = untouched_lines(&doc, Separator::ClosedEq, &desired);
        let out: Vec<String> = updated.lines().iter().map(|l| l.raw().to_string()).collect();
        prop_assert!(is_subsequence(&kept, &out));
    }

    #[test]
    fn space_update_preserves_unrelated_lines(text in document_strategy(Separator::Space), desired in desired_strategy()) {
        let doc = Document::parse(&text);
        let result = SpaceDialect.validate(&doc, &desired, Intent::Absent).unwrap();
        let updated = SpaceDialect.update(&doc, &result).unwrap();

        let kept = untouched_lines(&doc, Separator::Space, &desired);
        let out: Vec<String> = updated.lines().iter().map(|l| l.raw().to_string()).collect();
        prop_assert_eq!(kept, out);
    }
}
