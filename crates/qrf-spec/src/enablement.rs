use crate::answer::AnswerValue;
use crate::form::{FormItems, FormValue, GroupItems, GroupValue, answer_values};
use crate::path::{FieldPath, Segment};
use crate::spec::{EnableBehavior, EnableWhen, QuestionnaireItem};

static EMPTY_SCOPE: FormItems = FormItems::new();

/// Read-only view of the group scopes surrounding one item, innermost
/// last. A fresh context is built per evaluation pass; nothing is shared
/// or mutated across passes.
#[derive(Debug, Clone)]
pub struct EnablementContext<'a> {
    scopes: Vec<&'a FormItems>,
}

impl<'a> EnablementContext<'a> {
    pub fn new(root: &'a FormItems) -> Self {
        Self { scopes: vec![root] }
    }

    fn with_scope(&self, scope: &'a FormItems) -> Self {
        let mut scopes = self.scopes.clone();
        scopes.push(scope);
        Self { scopes }
    }

    fn current_scope(&self) -> &'a FormItems {
        self.scopes.last().copied().unwrap_or(&EMPTY_SCOPE)
    }

    /// Current answers of the referenced question, resolved against the
    /// nearest enclosing scope first and ancestors after. An unknown
    /// linkId yields the empty set; conditions then simply fail their
    /// check instead of erroring.
    pub fn answers_for(&self, link_id: &str) -> Vec<&'a AnswerValue> {
        for scope in self.scopes.iter().rev() {
            if let Some(FormValue::Answers(entries)) = scope.get(link_id) {
                return answer_values(entries);
            }
        }
        Vec::new()
    }
}

fn condition_satisfied(condition: &EnableWhen, ctx: &EnablementContext<'_>) -> bool {
    let observed = ctx.answers_for(&condition.question);
    condition.operator.check(&observed, &condition.answer)
}

/// Whether the item is currently active. Items without conditions are
/// unconditionally enabled; otherwise the conditions combine per the
/// item's enable behavior (`all` by default). Evaluation short-circuits;
/// conditions are side-effect free so the order cannot be observed.
pub fn is_enabled(item: &QuestionnaireItem, ctx: &EnablementContext<'_>) -> bool {
    if item.enable_when.is_empty() {
        return true;
    }

    match item.enable_behavior {
        EnableBehavior::All => item
            .enable_when
            .iter()
            .all(|condition| condition_satisfied(condition, ctx)),
        EnableBehavior::Any => item
            .enable_when
            .iter()
            .any(|condition| condition_satisfied(condition, ctx)),
    }
}

/// An enabled item paired with the structural path of the scope it renders
/// in. The field name of the item itself is `path` plus its linkId.
#[derive(Debug, Clone)]
pub struct EnabledQuestion<'a> {
    pub item: &'a QuestionnaireItem,
    pub path: FieldPath,
}

impl EnabledQuestion<'_> {
    /// The full path addressing this item's form value.
    pub fn field_path(&self) -> FieldPath {
        self.path.child(Segment::key(&self.item.link_id))
    }
}

/// Flattens the item tree into the currently visible items, in declaration
/// order. Disabled items are excluded together with their whole subtree.
/// Child paths append the group's linkId, then `items.<index>` per rendered
/// instance for repeating groups (at least one instance is always
/// rendered) or a bare `items` for non-repeating ones.
pub fn enabled_questions<'a>(
    items: &'a [QuestionnaireItem],
    parent_path: &FieldPath,
    ctx: &EnablementContext<'a>,
) -> Vec<EnabledQuestion<'a>> {
    let mut enabled = Vec::new();
    collect_enabled(items, parent_path, ctx, &mut enabled);
    enabled
}

fn collect_enabled<'a>(
    items: &'a [QuestionnaireItem],
    parent_path: &FieldPath,
    ctx: &EnablementContext<'a>,
    enabled: &mut Vec<EnabledQuestion<'a>>,
) {
    let scope = ctx.current_scope();

    for item in items {
        if !is_enabled(item, ctx) {
            continue;
        }
        enabled.push(EnabledQuestion {
            item,
            path: parent_path.clone(),
        });

        if item.item.is_empty() {
            continue;
        }

        let base = parent_path.child(Segment::key(&item.link_id));
        if item.repeats {
            let instances = match scope.get(&item.link_id) {
                Some(FormValue::Group(GroupValue {
                    items: GroupItems::Repeating(instances),
                })) => instances.as_slice(),
                _ => &[],
            };
            let count = instances.len().max(1);
            for index in 0..count {
                let child_path = base.items().child(Segment::Index(index));
                let instance_scope = instances.get(index).unwrap_or(&EMPTY_SCOPE);
                collect_enabled(
                    &item.item,
                    &child_path,
                    &ctx.with_scope(instance_scope),
                    enabled,
                );
            }
        } else {
            let instance_scope = match scope.get(&item.link_id) {
                Some(FormValue::Group(GroupValue {
                    items: GroupItems::Single(items),
                })) => items,
                _ => &EMPTY_SCOPE,
            };
            collect_enabled(
                &item.item,
                &base.items(),
                &ctx.with_scope(instance_scope),
                enabled,
            );
        }
    }
}

/// Prunes the form values of every currently disabled item so stale
/// answers never reach submission. Pure: returns a new form state.
pub fn remove_disabled_answers(items: &[QuestionnaireItem], form: &FormItems) -> FormItems {
    prune(items, &EnablementContext::new(form))
}

fn prune<'a>(items: &'a [QuestionnaireItem], ctx: &EnablementContext<'a>) -> FormItems {
    let scope = ctx.current_scope();
    let mut kept = FormItems::new();

    for item in items {
        let Some(value) = scope.get(&item.link_id) else {
            continue;
        };
        if !is_enabled(item, ctx) {
            continue;
        }

        if item.item.is_empty() {
            kept.insert(item.link_id.clone(), value.clone());
            continue;
        }

        match value {
            FormValue::Group(GroupValue {
                items: GroupItems::Single(inner),
            }) => {
                kept.insert(
                    item.link_id.clone(),
                    FormValue::Group(GroupValue {
                        items: GroupItems::Single(prune(&item.item, &ctx.with_scope(inner))),
                    }),
                );
            }
            FormValue::Group(GroupValue {
                items: GroupItems::Repeating(instances),
            }) => {
                let pruned = instances
                    .iter()
                    .map(|instance| prune(&item.item, &ctx.with_scope(instance)))
                    .collect();
                kept.insert(
                    item.link_id.clone(),
                    FormValue::Group(GroupValue {
                        items: GroupItems::Repeating(pruned),
                    }),
                );
            }
            // A leaf value stored under a group definition is kept as-is.
            FormValue::Answers(_) => {
                kept.insert(item.link_id.clone(), value.clone());
            }
        }
    }

    kept
}
