use crate::answer::FormAnswerItem;
use crate::form::{FormItems, FormValue, GroupItems, GroupValue};
use crate::response::{ResponseAnswer, ResponseItem};
use crate::spec::QuestionnaireItem;

/// Converts a populated response tree into initial form values.
///
/// The walk is definition-driven: response nodes without a matching
/// definition item are dropped, repeating groups collect their sibling
/// instances in document order, and leaf answers keep their stored order.
pub fn map_response_to_form(
    response_items: &[ResponseItem],
    definition: &[QuestionnaireItem],
) -> FormItems {
    let mut form = FormItems::new();

    for item in definition {
        let matching: Vec<&ResponseItem> = response_items
            .iter()
            .filter(|response| response.link_id == item.link_id)
            .collect();

        if item.item.is_empty() {
            let Some(found) = matching.first() else {
                continue;
            };
            let answers: Vec<FormAnswerItem> = found
                .answer
                .iter()
                .map(|answer| FormAnswerItem {
                    value: answer.value.clone(),
                })
                .collect();
            if !answers.is_empty() {
                form.insert(item.link_id.clone(), FormValue::Answers(answers));
            }
        } else if item.repeats {
            if matching.is_empty() {
                continue;
            }
            let instances = matching
                .iter()
                .map(|instance| map_response_to_form(&instance.item, &item.item))
                .collect();
            form.insert(
                item.link_id.clone(),
                FormValue::Group(GroupValue {
                    items: GroupItems::Repeating(instances),
                }),
            );
        } else if let Some(found) = matching.first() {
            form.insert(
                item.link_id.clone(),
                FormValue::Group(GroupValue {
                    items: GroupItems::Single(map_response_to_form(&found.item, &item.item)),
                }),
            );
        }
    }

    form
}

/// Converts form values back into response items for submission.
///
/// The inverse of [`map_response_to_form`]: declaration order is
/// preserved, unfilled answer slots and empty scopes are skipped, and each
/// repeat instance becomes one sibling node sharing the group's linkId.
pub fn map_form_to_response(form: &FormItems, definition: &[QuestionnaireItem]) -> Vec<ResponseItem> {
    let mut response = Vec::new();

    for item in definition {
        match form.get(&item.link_id) {
            Some(FormValue::Answers(answers)) => {
                let answer: Vec<ResponseAnswer> = answers
                    .iter()
                    .filter(|entry| entry.value.is_some())
                    .map(|entry| ResponseAnswer {
                        value: entry.value.clone(),
                    })
                    .collect();
                if !answer.is_empty() {
                    response.push(ResponseItem {
                        link_id: item.link_id.clone(),
                        answer,
                        item: Vec::new(),
                    });
                }
            }
            Some(FormValue::Group(GroupValue {
                items: GroupItems::Single(scope),
            })) => {
                let children = map_form_to_response(scope, &item.item);
                if !children.is_empty() {
                    response.push(ResponseItem {
                        link_id: item.link_id.clone(),
                        answer: Vec::new(),
                        item: children,
                    });
                }
            }
            Some(FormValue::Group(GroupValue {
                items: GroupItems::Repeating(instances),
            })) => {
                for scope in instances {
                    let children = map_form_to_response(scope, &item.item);
                    if !children.is_empty() {
                        response.push(ResponseItem {
                            link_id: item.link_id.clone(),
                            answer: Vec::new(),
                            item: children,
                        });
                    }
                }
            }
            None => {}
        }
    }

    response
}
