//! Table naming conventions.

use super::EntityDef;

/// Strategy for deriving a table name from an entity definition.
///
/// An explicit name on the definition always wins; conventions only decide
/// what to do with the bare type name.
pub trait TableNameConvention: Send + Sync {
    /// Returns the table name for the given definition.
    fn table_name(&self, def: &EntityDef) -> String;
}

/// Default convention: explicit override if present, otherwise the type
/// name pluralized by appending `s`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTableNameConvention;

impl TableNameConvention for DefaultTableNameConvention {
    fn table_name(&self, def: &EntityDef) -> String {
        match def.table_name() {
            Some(name) => String::from(name),
            None => format!("{}s", def.type_name()),
        }
    }
}

/// Convention that takes the type name as-is when no override is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonPluralizingTableNameConvention;

impl TableNameConvention for NonPluralizingTableNameConvention {
    fn table_name(&self, def: &EntityDef) -> String {
        match def.table_name() {
            Some(name) => String::from(name),
            None => String::from(def.type_name()),
        }
    }
}
