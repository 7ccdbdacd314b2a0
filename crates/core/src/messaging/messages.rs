//! Message payloads

/// Published after the configuration has been saved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationChangedMessage {
    /// Setting that changed; `None` means unspecified or several
    pub changed_property_hint: Option<String>,
}

impl ConfigurationChangedMessage {
    pub fn new(changed_property_hint: Option<String>) -> Self {
        Self {
            changed_property_hint,
        }
    }

    /// Whether `property` may have changed.
    ///
    /// Always true when no hint was given; otherwise an exact,
    /// case-sensitive comparison.
    pub fn is_property_changed(&self, property: &str) -> bool {
        self.changed_property_hint
            .as_deref()
            .map_or(true, |hint| hint == property)
    }
}
