use std::fmt;

use thiserror::Error;

use crate::form::{
    FormError, FormItems, FormValue, GroupItems, GroupValue, set_group_items, value_at,
};
use crate::path::FieldPath;

/// Factory producing the scope of a freshly added instance.
pub type BlankInstance = Box<dyn Fn() -> FormItems + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("`{0}` is not a repeating group")]
    NotRepeating(FieldPath),
    #[error("no repeating group exists at `{0}`")]
    PathNotFound(FieldPath),
    #[error("instance index {index} is out of range ({count} instances)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Owns add/remove-instance operations for one repeating group, keeping
/// the rendered instance count consistent with the backing field array.
///
/// One implicit instance is always rendered even before the form state
/// holds any, matching how the evaluator enumerates repeat instances.
pub struct GroupController {
    path: FieldPath,
    blank: BlankInstance,
}

impl GroupController {
    /// Controller with the default blank-instance factory (an empty scope).
    pub fn new(path: FieldPath) -> Self {
        Self {
            path,
            blank: Box::new(FormItems::new),
        }
    }

    /// Controller with a custom blank-instance factory, for groups whose
    /// fresh instances carry preset values.
    pub fn with_factory(
        path: FieldPath,
        factory: impl Fn() -> FormItems + Send + Sync + 'static,
    ) -> Self {
        Self {
            path,
            blank: Box::new(factory),
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Number of rendered instances: the backing array length, or 1 while
    /// the group has no stored value yet.
    pub fn instance_count(&self, form: &FormItems) -> usize {
        match value_at(form, &self.path) {
            Some(FormValue::Group(GroupValue {
                items: GroupItems::Repeating(instances),
            })) => instances.len().max(1),
            _ => 1,
        }
    }

    /// Appends one blank instance and returns the new instance count.
    /// A group absent from the form state is materialized first with its
    /// single implicit instance.
    pub fn add_instance(&self, form: &mut FormItems) -> Result<usize, GroupError> {
        match group_items_mut(form, &self.path) {
            Some(GroupItems::Repeating(instances)) => {
                if instances.is_empty() {
                    instances.push((self.blank)());
                }
                instances.push((self.blank)());
                Ok(instances.len())
            }
            Some(GroupItems::Single(_)) => Err(GroupError::NotRepeating(self.path.clone())),
            None => {
                let instances = vec![(self.blank)(), (self.blank)()];
                let count = instances.len();
                set_group_items(form, &self.path, GroupItems::Repeating(instances))?;
                Ok(count)
            }
        }
    }

    /// Removes exactly the instance at `index`, preserving the order of
    /// the rest. An out-of-range index is an explicit error, never a
    /// panic.
    pub fn remove_instance(&self, form: &mut FormItems, index: usize) -> Result<(), GroupError> {
        match group_items_mut(form, &self.path) {
            Some(GroupItems::Repeating(instances)) => {
                if index >= instances.len() {
                    return Err(GroupError::IndexOutOfRange {
                        index,
                        count: instances.len(),
                    });
                }
                instances.remove(index);
                Ok(())
            }
            Some(GroupItems::Single(_)) => Err(GroupError::NotRepeating(self.path.clone())),
            None => Err(GroupError::PathNotFound(self.path.clone())),
        }
    }
}

impl fmt::Debug for GroupController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupController")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Mutable access to the instances stored at `path`; `None` when the path
/// does not lead to a group value.
fn group_items_mut<'a>(form: &'a mut FormItems, path: &FieldPath) -> Option<&'a mut GroupItems> {
    use crate::path::Segment;

    let segments = path.segments();
    let mut scope = form;
    let mut position = 0;

    loop {
        let Segment::Key(key) = segments.get(position)? else {
            return None;
        };
        position += 1;

        if position == segments.len() {
            return match scope.get_mut(key)? {
                FormValue::Group(group) => Some(&mut group.items),
                FormValue::Answers(_) => None,
            };
        }

        let FormValue::Group(group) = scope.get_mut(key)? else {
            return None;
        };
        let Segment::Items = segments.get(position)? else {
            return None;
        };
        position += 1;

        scope = match &mut group.items {
            GroupItems::Single(items) => items,
            GroupItems::Repeating(instances) => {
                let Segment::Index(index) = segments.get(position)? else {
                    return None;
                };
                position += 1;
                instances.get_mut(*index)?
            }
        };
    }
}
