//! Common traits for Reward Cloud resources

/// Common trait for selectable resources (organisations, teams, projects, environments)
pub trait CloudResource {
    /// Numeric resource ID
    fn id(&self) -> u32;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Short machine name
    fn code_name(&self) -> &str;

    /// ID in the decimal-string form stored in contexts
    fn id_string(&self) -> String {
        self.id().to_string()
    }
}
