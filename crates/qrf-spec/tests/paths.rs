use qrf_spec::{
    AnswerValue, EnablementContext, FieldPath, FormAnswerItem, ItemType, QuestionnaireItem,
    QuestionnaireResponse, ResponseAnswer, ResponseItem, Segment, enabled_questions,
    initial_item_count, map_form_to_response, map_response_to_form, resolve, scope_at,
};

fn fixture() -> QuestionnaireResponse {
    serde_json::from_str(include_str!("fixtures/repeatable_groups.json")).expect("deserialize")
}

fn path(text: &str) -> FieldPath {
    text.parse().expect("parse path")
}

#[test]
fn counts_direct_children_of_the_root() {
    let resource = fixture();
    assert_eq!(
        initial_item_count(&resource.item, &FieldPath::new(), "main-group"),
        1
    );
    assert_eq!(
        initial_item_count(&resource.item, &FieldPath::new(), "missing"),
        0
    );
}

#[test]
fn counts_repeating_instances_per_scope() {
    let resource = fixture();

    assert_eq!(
        initial_item_count(
            &resource.item,
            &path("main-group.items.primary-group.items"),
            "group11"
        ),
        2
    );
    // Without an explicit index the first group11 instance is selected.
    assert_eq!(
        initial_item_count(
            &resource.item,
            &path("main-group.items.primary-group.items.group11.items"),
            "group12"
        ),
        3
    );
    assert_eq!(
        initial_item_count(
            &resource.item,
            &path("main-group.items.secondary-group.items"),
            "group21"
        ),
        2
    );
}

#[test]
fn explicit_index_selects_a_later_instance() {
    let resource = fixture();

    assert_eq!(
        initial_item_count(
            &resource.item,
            &path("main-group.items.primary-group.items.group11.items.1.group12.items"),
            "text11"
        ),
        1
    );
    // Out-of-range instance index empties the candidate set.
    assert_eq!(
        initial_item_count(
            &resource.item,
            &path("main-group.items.primary-group.items.group11.items.5.group12.items"),
            "text11"
        ),
        0
    );
}

#[test]
fn unknown_link_id_returns_zero_not_an_error() {
    let resource = fixture();
    assert_eq!(
        initial_item_count(&resource.item, &path("main-group.items"), "non-existent"),
        0
    );
    assert_eq!(
        initial_item_count(&resource.item, &path("nowhere.items"), "group11"),
        0
    );
}

#[test]
fn resolve_does_not_mutate_and_is_repeatable() {
    let resource = fixture();
    let snapshot = resource.clone();
    let group_path = path("main-group.items.primary-group.items.group11.items");

    let first = resolve(&resource.item, &group_path);
    let second = resolve(&resource.item, &group_path);

    assert_eq!(first.len(), second.len());
    assert_eq!(resource, snapshot);
}

#[test]
fn path_text_round_trips() {
    let original = path("main-group.items.primary-group.items.group11.items.1.group12");
    let rendered = original.to_string();
    assert_eq!(
        rendered,
        "main-group.items.primary-group.items.group11.items.1.group12"
    );
    assert_eq!(rendered.parse::<FieldPath>().expect("reparse"), original);

    assert_eq!(
        original.segments()[1],
        Segment::Items,
        "the items token parses as the separator"
    );
    assert_eq!(original.segments()[6], Segment::Index(1));
}

fn visit_definition() -> Vec<QuestionnaireItem> {
    let mut visit = QuestionnaireItem::new("visit", ItemType::Group);
    visit.repeats = true;
    let mut note = QuestionnaireItem::new("note", ItemType::String);
    note.required = false;
    visit.item.push(note);
    vec![visit]
}

fn visit_response() -> Vec<ResponseItem> {
    let note = |text: &str| ResponseItem {
        link_id: "note".into(),
        answer: vec![ResponseAnswer::new(AnswerValue::String(text.into()))],
        item: Vec::new(),
    };
    vec![
        ResponseItem {
            link_id: "visit".into(),
            answer: Vec::new(),
            item: vec![note("first visit")],
        },
        ResponseItem {
            link_id: "visit".into(),
            answer: Vec::new(),
            item: vec![note("second visit")],
        },
    ]
}

#[test]
fn evaluator_paths_resolve_back_to_the_instance_subtree() {
    let definition = visit_definition();
    let response = visit_response();
    let form = map_response_to_form(&response, &definition);

    let ctx = EnablementContext::new(&form);
    let enabled = enabled_questions(&definition, &FieldPath::new(), &ctx);

    // visit, then one note per rendered instance.
    assert_eq!(enabled.len(), 3);
    let second_note = &enabled[2];
    assert_eq!(second_note.path.to_string(), "visit.items.1");

    // The same path addresses the instance scope in form state.
    let scope = scope_at(&form, &second_note.path).expect("scope");
    assert!(scope.contains_key("note"));
    assert!(scope_at(&form, &path("visit.items.5")).is_none());

    let round_tripped = map_form_to_response(&form, &definition);
    let subtree = resolve(&round_tripped, &second_note.path);
    assert_eq!(subtree.len(), 1);
    assert_eq!(subtree[0].link_id, "note");
    assert_eq!(
        subtree[0].answer[0].value,
        Some(AnswerValue::String("second visit".into()))
    );
}

#[test]
fn response_form_mapping_round_trips() {
    let definition = visit_definition();
    let response = visit_response();

    let form = map_response_to_form(&response, &definition);
    let back = map_form_to_response(&form, &definition);

    assert_eq!(back, response);
}

#[test]
fn unfilled_answer_slots_are_dropped_on_the_way_back() {
    let definition = vec![QuestionnaireItem::new("name", ItemType::String)];
    let mut form = qrf_spec::FormItems::new();
    qrf_spec::set_answers(
        &mut form,
        &path("name"),
        vec![FormAnswerItem::default()],
    )
    .expect("set");

    assert!(map_form_to_response(&form, &definition).is_empty());
}
