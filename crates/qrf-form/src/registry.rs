use std::collections::BTreeMap;

use qrf_spec::{EnabledQuestion, FieldPath, ItemType, QuestionnaireItem};

/// Pluggable renderer lookup, keyed by item type and, with higher
/// precedence, by item-control code. `W` is whatever the host treats as a
/// widget (a component handle, a closure, an id).
pub struct WidgetRegistry<W> {
    by_type: BTreeMap<ItemType, W>,
    by_control: BTreeMap<String, W>,
}

impl<W> WidgetRegistry<W> {
    pub fn new() -> Self {
        Self {
            by_type: BTreeMap::new(),
            by_control: BTreeMap::new(),
        }
    }

    pub fn register_type(&mut self, item_type: ItemType, widget: W) -> &mut Self {
        self.by_type.insert(item_type, widget);
        self
    }

    pub fn register_item_control(&mut self, code: impl Into<String>, widget: W) -> &mut Self {
        self.by_control.insert(code.into(), widget);
        self
    }

    /// The widget for an item: the item-control mapping wins when the item
    /// carries a registered control code, the type mapping is the
    /// fallback. A full miss is reported and yields `None`; rendering
    /// skips the item instead of failing.
    pub fn lookup(&self, item: &QuestionnaireItem) -> Option<&W> {
        if let Some(code) = item.control_code()
            && let Some(widget) = self.by_control.get(code)
        {
            return Some(widget);
        }

        let widget = self.by_type.get(&item.item_type);
        if widget.is_none() {
            log::error!("item type `{}` is not supported", item.item_type.as_str());
        }
        widget
    }
}

impl<W> Default for WidgetRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// One enabled item resolved to its widget and render location.
#[derive(Debug)]
pub struct PlannedItem<'a, W> {
    pub item: &'a QuestionnaireItem,
    pub path: FieldPath,
    pub widget: &'a W,
}

/// Pairs every enabled question with its widget, dropping (and logging)
/// the ones no widget is registered for.
pub fn render_plan<'a, W>(
    registry: &'a WidgetRegistry<W>,
    enabled: &[EnabledQuestion<'a>],
) -> Vec<PlannedItem<'a, W>> {
    enabled
        .iter()
        .filter_map(|question| {
            registry.lookup(question.item).map(|widget| PlannedItem {
                item: question.item,
                path: question.path.clone(),
                widget,
            })
        })
        .collect()
}
