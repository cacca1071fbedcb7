use crate::identity::BucketIdentity;

/// Property carrying a handle's display name.
pub const NAME_PROPERTY: &str = "name";

/// A property-changed notification for the host's notification bus.
///
/// Emitted on every prefix change, including changes that leave the value
/// untouched; hosts treat it as a request to re-sync, not strictly as a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    /// Identity of the handle after the change
    pub source: BucketIdentity,
    pub property: &'static str,
    pub old_value: String,
    pub new_value: String,
}

impl PropertyChange {
    pub fn name_changed(
        source: BucketIdentity,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            source,
            property: NAME_PROPERTY,
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.old_value == self.new_value
    }
}
