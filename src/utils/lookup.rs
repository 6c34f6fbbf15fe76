use crate::models::{HostModel, SwitchModel};

/// Items that can be looked up by name
pub trait Named {
    fn name(&self) -> Option<&str>;
}

impl Named for HostModel {
    fn name(&self) -> Option<&str> {
        HostModel::name(self)
    }
}

impl Named for SwitchModel {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Cannot find object with name {name}")]
    NotFound { name: String },

    #[error("Object at position {index} has no name")]
    MissingName { index: usize },
}

/// First item called `name`
///
/// Items are checked in order; an unnamed item met before a match is an error.
pub fn get_item_by_name<'a, T: Named>(name: &str, items: &'a [T]) -> Result<&'a T, LookupError> {
    for (index, item) in items.iter().enumerate() {
        match item.name() {
            Some(item_name) if item_name == name => return Ok(item),
            Some(_) => {}
            None => return Err(LookupError::MissingName { index }),
        }
    }
    Err(LookupError::NotFound { name: name.to_string() })
}
