//! Configured entity kinds and their operator-facing messages

/// A kind of configured entity, each stored in its own INI file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Monitoring data backend (`backends.ini`)
    Backend,
    /// Monitoring instance accepting commands (`instances.ini`)
    Instance,
}

impl EntityKind {
    pub fn all() -> &'static [EntityKind] {
        &[EntityKind::Backend, EntityKind::Instance]
    }

    /// Capitalized name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Backend => "Backend",
            EntityKind::Instance => "Instance",
        }
    }

    /// Plural name, also the default file stem
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Backend => "backends",
            EntityKind::Instance => "instances",
        }
    }

    pub fn created(&self, name: &str) -> String {
        format!("{} \"{}\" created successfully.", self.label(), name)
    }

    pub fn modified(&self, name: &str) -> String {
        format!("{} \"{}\" successfully modified.", self.label(), name)
    }

    pub fn removed(&self, name: &str) -> String {
        format!("{} \"{}\" successfully removed.", self.label(), name)
    }

    /// Message for an action on an entity that does not exist
    pub fn not_found(&self, action: &str, name: &str) -> String {
        format!(
            "Cannot {} \"{}\". {} not found.",
            action,
            name,
            self.label()
        )
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            EntityKind::Backend.modified("ido"),
            "Backend \"ido\" successfully modified."
        );
        assert_eq!(
            EntityKind::Instance.not_found("remove", "icinga"),
            "Cannot remove \"icinga\". Instance not found."
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(EntityKind::Instance.to_string(), "instance");
        assert_eq!(EntityKind::Backend.plural(), "backends");
    }
}
