//! Example entities shared by the synthesis tests.

use kestrel_core::schema::{ColumnDef, Entity, EntityDef};
use kestrel_core::{DbKind, SqlValue};

pub struct Dog;

impl Entity for Dog {
    fn describe() -> EntityDef {
        EntityDef::new("Dog")
            .column(ColumnDef::new("Id", DbKind::Int64).primary_key().auto_increment())
            .column(ColumnDef::new("Name", DbKind::Text))
            .column(ColumnDef::new("Age", DbKind::Int32))
    }
}

pub struct KeyExplicit;

impl Entity for KeyExplicit {
    fn describe() -> EntityDef {
        EntityDef::new("KeyExplicit")
            .table("KeyExplicit")
            .column(ColumnDef::new("Key", DbKind::Int64).primary_key().auto_increment())
            .column(ColumnDef::new("Name", DbKind::Text))
    }
}

pub struct KeyAlias;

impl Entity for KeyAlias {
    fn describe() -> EntityDef {
        EntityDef::new("KeyAlias")
            .table("KeyAlias")
            .column(ColumnDef::new("Id", DbKind::Int64).named("Key").primary_key().auto_increment())
            .column(ColumnDef::new("Name", DbKind::Text))
    }
}

pub struct KeyNotGenerated;

impl Entity for KeyNotGenerated {
    fn describe() -> EntityDef {
        EntityDef::new("KeyNotGenerated")
            .table("KeyNotGenerated")
            .column(ColumnDef::new("Id", DbKind::Int64).primary_key())
            .column(ColumnDef::new("Name", DbKind::Text))
    }
}

pub struct PropertyAlias;

impl Entity for PropertyAlias {
    fn describe() -> EntityDef {
        EntityDef::new("PropertyAlias")
            .table("PropertyAlias")
            .column(ColumnDef::new("Id", DbKind::Int64).primary_key().auto_increment())
            .column(ColumnDef::new("Age", DbKind::Int32).named("YearsOld"))
    }
}

pub struct CompositeKeys;

impl Entity for CompositeKeys {
    fn describe() -> EntityDef {
        EntityDef::new("CompositeKeys")
            .table("CompositeKeys")
            .column(ColumnDef::new("Key1", DbKind::Int64).primary_key())
            .column(ColumnDef::new("Key2", DbKind::Int64).primary_key())
            .column(ColumnDef::new("Name", DbKind::Text))
    }
}

pub struct PropertyComputed;

impl Entity for PropertyComputed {
    fn describe() -> EntityDef {
        EntityDef::new("PropertyComputed")
            .table("PropertyComputed")
            .column(ColumnDef::new("Id", DbKind::Int64).primary_key().auto_increment())
            .column(ColumnDef::new("Name", DbKind::Text))
            .column(ColumnDef::new("LastUpdated", DbKind::Timestamp).computed())
    }
}

pub struct PropertyGenerated;

impl Entity for PropertyGenerated {
    fn describe() -> EntityDef {
        EntityDef::new("PropertyGenerated")
            .table("PropertyGenerated")
            .column(ColumnDef::new("Id", DbKind::Int64).primary_key().auto_increment())
            .column(ColumnDef::new("Name", DbKind::Text))
            .column(ColumnDef::new("Created", DbKind::Timestamp).generated())
    }
}

pub struct Keyless;

impl Entity for Keyless {
    fn describe() -> EntityDef {
        EntityDef::new("Keyless")
            .table("Keyless")
            .column(ColumnDef::new("Message", DbKind::Text))
    }
}

pub struct TempDog;

impl Entity for TempDog {
    fn describe() -> EntityDef {
        EntityDef::new("TempDog")
            .table("#Dogs")
            .column(ColumnDef::new("Id", DbKind::Int64).primary_key().auto_increment())
            .column(ColumnDef::new("Name", DbKind::Text))
            .column(ColumnDef::new("Age", DbKind::Int32))
    }
}

pub struct TempNoColumns;

impl Entity for TempNoColumns {
    fn describe() -> EntityDef {
        EntityDef::new("TempNoColumns").table("#NoColumns")
    }
}

pub struct PgTempDog;

impl Entity for PgTempDog {
    fn describe() -> EntityDef {
        EntityDef::new("PgTempDog")
            .table("temp_dogs")
            .column(ColumnDef::new("Id", DbKind::Int64).primary_key().auto_increment())
            .column(ColumnDef::new("Name", DbKind::Text))
    }
}

/// Builds an owned parameter list from borrowed pairs.
pub fn params(pairs: &[(&str, SqlValue)]) -> Vec<(String, SqlValue)> {
    pairs
        .iter()
        .map(|(name, value)| (String::from(*name), value.clone()))
        .collect()
}
