//! Exact-text synthesis tests for every statement shape, run against the
//! SQL Server dialect with Postgres/SQLite variants where the dialects
//! diverge.

mod common;

use common::*;
use kestrel_core::dialect::{MsSql2012Dialect, PostgresDialect, SqliteDialect};
use kestrel_core::schema::SchemaFactory;
use kestrel_core::{Dialect, KeyValue, Page, SqlCommand, SqlValue, ToSqlValue};

fn mssql() -> MsSql2012Dialect {
    MsSql2012Dialect::new()
}

mod count {
    use super::*;

    #[test]
    fn without_conditions() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_count_command(None, &[], &schema);

        assert_eq!(
            command,
            SqlCommand::new("SELECT COUNT(*)\nFROM [Dogs]")
        );
    }

    #[test]
    fn with_conditions() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command =
            mssql().make_count_command(Some("WHERE Name LIKE @Name"), &params(&[("Name", "Foo%".to_sql_value())]), &schema);

        assert_eq!(
            command,
            SqlCommand::with_params(
                "SELECT COUNT(*)\nFROM [Dogs]\nWHERE Name LIKE @Name",
                params(&[("Name", "Foo%".to_sql_value())]),
            )
        );
    }

    #[test]
    fn blank_conditions_are_ignored() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_count_command(Some("   "), &[], &schema);

        assert_eq!(command.text(), "SELECT COUNT(*)\nFROM [Dogs]");
    }
}

mod find {
    use super::*;

    #[test]
    fn by_single_key() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_find_command(5.into(), &schema).unwrap();

        assert_eq!(
            command,
            SqlCommand::with_params(
                "SELECT [Id], [Name], [Age]\nFROM [Dogs]\nWHERE [Id] = @Id",
                params(&[("Id", SqlValue::Int(5))]),
            )
        );
    }

    #[test]
    fn null_key_is_rejected() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let result = mssql().make_find_command(KeyValue::Single(SqlValue::Null), &schema);

        assert!(result.is_err());
    }

    #[test]
    fn keyless_table_is_rejected() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Keyless>();

        let result = mssql().make_find_command(5.into(), &schema);

        assert!(result.is_err());
    }

    #[test]
    fn explicit_key_name() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<KeyExplicit>();

        let command = mssql().make_find_command(5.into(), &schema).unwrap();

        assert_eq!(
            command,
            SqlCommand::with_params(
                "SELECT [Key], [Name]\nFROM [KeyExplicit]\nWHERE [Key] = @Key",
                params(&[("Key", SqlValue::Int(5))]),
            )
        );
    }

    #[test]
    fn aliased_key_selects_as_property_and_binds_property_name() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<KeyAlias>();

        let command = mssql().make_find_command(5.into(), &schema).unwrap();

        assert_eq!(
            command,
            SqlCommand::with_params(
                "SELECT [Key] AS [Id], [Name]\nFROM [KeyAlias]\nWHERE [Key] = @Id",
                params(&[("Id", SqlValue::Int(5))]),
            )
        );
    }

    #[test]
    fn aliased_property_selects_as_property() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<PropertyAlias>();

        let command = mssql().make_find_command(5.into(), &schema).unwrap();

        assert_eq!(
            command,
            SqlCommand::with_params(
                "SELECT [Id], [YearsOld] AS [Age]\nFROM [PropertyAlias]\nWHERE [Id] = @Id",
                params(&[("Id", SqlValue::Int(5))]),
            )
        );
    }

    #[test]
    fn composite_key_takes_named_values() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<CompositeKeys>();

        let key = KeyValue::Composite(params(&[
            ("key1", SqlValue::Int(2)),
            ("key2", SqlValue::Int(3)),
        ]));
        let command = mssql().make_find_command(key, &schema).unwrap();

        assert_eq!(
            command,
            SqlCommand::with_params(
                "SELECT [Key1], [Key2], [Name]\nFROM [CompositeKeys]\nWHERE [Key1] = @Key1 AND [Key2] = @Key2",
                params(&[("Key1", SqlValue::Int(2)), ("Key2", SqlValue::Int(3))]),
            )
        );
    }

    #[test]
    fn composite_key_rejects_single_value() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<CompositeKeys>();

        let result = mssql().make_find_command(5.into(), &schema);

        assert!(result.is_err());
    }

    #[test]
    fn composite_key_rejects_missing_member() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<CompositeKeys>();

        let key = KeyValue::Composite(params(&[("key1", SqlValue::Int(2))]));
        let result = mssql().make_find_command(key, &schema);

        assert!(result.is_err());
    }
}

mod get_range {
    use super::*;

    #[test]
    fn without_conditions() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_get_range_command(None, &[], &schema);

        assert_eq!(
            command,
            SqlCommand::new("SELECT [Id], [Name], [Age]\nFROM [Dogs]")
        );
    }

    #[test]
    fn with_conditions() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_get_range_command(
            Some("WHERE Age > @Age"),
            &params(&[("Age", SqlValue::Int(10))]),
            &schema,
        );

        assert_eq!(
            command,
            SqlCommand::with_params(
                "SELECT [Id], [Name], [Age]\nFROM [Dogs]\nWHERE Age > @Age",
                params(&[("Age", SqlValue::Int(10))]),
            )
        );
    }
}

mod get_first_n {
    use super::*;

    #[test]
    fn top_prefix_with_ordering() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_get_first_n_command(
            1,
            Some("WHERE Name LIKE @Name"),
            &params(&[("Name", "Foo%".to_sql_value())]),
            "Name",
            &schema,
        );

        assert_eq!(
            command,
            SqlCommand::with_params(
                "SELECT TOP 1 [Id], [Name], [Age]\nFROM [Dogs]\nWHERE Name LIKE @Name\nORDER BY Name",
                params(&[("Name", "Foo%".to_sql_value())]),
            )
        );
    }

    #[test]
    fn blank_ordering_omits_order_by() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_get_first_n_command(
            1,
            Some("WHERE Name LIKE @Name"),
            &params(&[("Name", "Foo%".to_sql_value())]),
            "",
            &schema,
        );

        assert_eq!(
            command.text(),
            "SELECT TOP 1 [Id], [Name], [Age]\nFROM [Dogs]\nWHERE Name LIKE @Name"
        );
    }

    #[test]
    fn limit_suffix_goes_after_order_by() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = PostgresDialect::new().make_get_first_n_command(
            2,
            None,
            &[],
            "Name",
            &schema,
        );

        assert_eq!(
            command.text(),
            "SELECT \"Id\", \"Name\", \"Age\"\nFROM \"Dogs\"\nORDER BY Name\nLIMIT 2"
        );
    }
}

mod get_page {
    use super::*;

    #[test]
    fn first_page() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql()
            .make_get_page_command(Page::new(1, 10).unwrap(), None, &[], "Name", &schema)
            .unwrap();

        assert_eq!(
            command.text(),
            "SELECT [Id], [Name], [Age]\nFROM [Dogs]\nORDER BY Name\nOFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn later_page_offsets_by_whole_pages() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql()
            .make_get_page_command(
                Page::new(3, 10).unwrap(),
                Some("WHERE Age > @Age"),
                &params(&[("Age", SqlValue::Int(10))]),
                "Name",
                &schema,
            )
            .unwrap();

        assert_eq!(
            command,
            SqlCommand::with_params(
                "SELECT [Id], [Name], [Age]\nFROM [Dogs]\nWHERE Age > @Age\nORDER BY Name\nOFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY",
                params(&[("Age", SqlValue::Int(10))]),
            )
        );
    }

    #[test]
    fn blank_ordering_is_rejected() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let result =
            mssql().make_get_page_command(Page::new(1, 10).unwrap(), None, &[], "  ", &schema);

        assert!(result.is_err());
    }

    #[test]
    fn postgres_uses_limit_offset() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = PostgresDialect::new()
            .make_get_page_command(Page::new(2, 5).unwrap(), None, &[], "Name", &schema)
            .unwrap();

        assert_eq!(
            command.text(),
            "SELECT \"Id\", \"Name\", \"Age\"\nFROM \"Dogs\"\nORDER BY Name\nLIMIT 5 OFFSET 5"
        );
    }
}

mod insert {
    use super::*;

    #[test]
    fn skips_generated_columns() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_insert_command(
            &params(&[
                ("Name", "Foo".to_sql_value()),
                ("Age", SqlValue::Int(10)),
            ]),
            &schema,
        );

        assert_eq!(
            command,
            SqlCommand::with_params(
                "INSERT INTO [Dogs] ([Name], [Age])\nVALUES (@Name, @Age);",
                params(&[("Name", "Foo".to_sql_value()), ("Age", SqlValue::Int(10))]),
            )
        );
    }

    #[test]
    fn explicit_key_is_inserted() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<KeyNotGenerated>();

        let command = mssql().make_insert_command(
            &params(&[("Id", SqlValue::Int(6)), ("Name", "Foo".to_sql_value())]),
            &schema,
        );

        assert_eq!(
            command,
            SqlCommand::with_params(
                "INSERT INTO [KeyNotGenerated] ([Id], [Name])\nVALUES (@Id, @Name);",
                params(&[("Id", SqlValue::Int(6)), ("Name", "Foo".to_sql_value())]),
            )
        );
    }

    #[test]
    fn computed_and_generated_columns_are_skipped() {
        let factory = SchemaFactory::default();
        let computed = factory.get_table_schema::<PropertyComputed>();
        let generated = factory.get_table_schema::<PropertyGenerated>();

        let command = mssql()
            .make_insert_command(&params(&[("Name", "Foo".to_sql_value())]), &computed);
        assert_eq!(
            command.text(),
            "INSERT INTO [PropertyComputed] ([Name])\nVALUES (@Name);"
        );

        let command = mssql()
            .make_insert_command(&params(&[("Name", "Foo".to_sql_value())]), &generated);
        assert_eq!(
            command.text(),
            "INSERT INTO [PropertyGenerated] ([Name])\nVALUES (@Name);"
        );
    }

    #[test]
    fn missing_entity_value_binds_null() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command =
            mssql().make_insert_command(&params(&[("Name", "Foo".to_sql_value())]), &schema);

        assert_eq!(
            command.params(),
            &params(&[("Name", "Foo".to_sql_value()), ("Age", SqlValue::Null)])
        );
    }
}

mod insert_returning {
    use super::*;

    #[test]
    fn mssql_appends_scope_identity() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql()
            .make_insert_returning_pk_command(
                &params(&[("Name", "Foo".to_sql_value()), ("Age", SqlValue::Int(10))]),
                &schema,
            )
            .unwrap();

        assert_eq!(
            command.text(),
            "INSERT INTO [Dogs] ([Name], [Age])\nVALUES (@Name, @Age);\nSELECT CAST(SCOPE_IDENTITY() AS BIGINT) AS [id]"
        );
    }

    #[test]
    fn postgres_appends_returning() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = PostgresDialect::new()
            .make_insert_returning_pk_command(
                &params(&[("Name", "Foo".to_sql_value()), ("Age", SqlValue::Int(10))]),
                &schema,
            )
            .unwrap();

        assert_eq!(
            command.text(),
            "INSERT INTO \"Dogs\" (\"Name\", \"Age\")\nVALUES (@Name, @Age)\nRETURNING \"Id\""
        );
    }

    #[test]
    fn sqlite_appends_last_insert_rowid() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = SqliteDialect::new()
            .make_insert_returning_pk_command(
                &params(&[("Name", "Foo".to_sql_value()), ("Age", SqlValue::Int(10))]),
                &schema,
            )
            .unwrap();

        assert_eq!(
            command.text(),
            "INSERT INTO \"Dogs\" (\"Name\", \"Age\")\nVALUES (@Name, @Age);\nSELECT last_insert_rowid() AS id"
        );
    }

    #[test]
    fn composite_key_is_rejected() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<CompositeKeys>();

        let result = mssql().make_insert_returning_pk_command(
            &params(&[("Name", "Foo".to_sql_value())]),
            &schema,
        );

        assert!(result.is_err());
    }
}

mod update {
    use super::*;

    #[test]
    fn sets_updatable_columns_and_filters_on_key() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql()
            .make_update_command(
                &params(&[
                    ("Id", SqlValue::Int(5)),
                    ("Name", "Foo".to_sql_value()),
                    ("Age", SqlValue::Int(10)),
                ]),
                &schema,
            )
            .unwrap();

        assert_eq!(
            command,
            SqlCommand::with_params(
                "UPDATE [Dogs]\nSET [Name] = @Name, [Age] = @Age\nWHERE [Id] = @Id",
                params(&[
                    ("Name", "Foo".to_sql_value()),
                    ("Age", SqlValue::Int(10)),
                    ("Id", SqlValue::Int(5)),
                ]),
            )
        );
    }

    #[test]
    fn composite_key_filters_on_all_key_columns() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<CompositeKeys>();

        let command = mssql()
            .make_update_command(
                &params(&[
                    ("Key1", SqlValue::Int(7)),
                    ("Key2", SqlValue::Int(8)),
                    ("Name", "Fizz".to_sql_value()),
                ]),
                &schema,
            )
            .unwrap();

        assert_eq!(
            command.text(),
            "UPDATE [CompositeKeys]\nSET [Name] = @Name\nWHERE [Key1] = @Key1 AND [Key2] = @Key2"
        );
    }

    #[test]
    fn aliased_column_sets_real_name_binds_property() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<PropertyAlias>();

        let command = mssql()
            .make_update_command(
                &params(&[("Id", SqlValue::Int(5)), ("Age", SqlValue::Int(10))]),
                &schema,
            )
            .unwrap();

        assert_eq!(
            command.text(),
            "UPDATE [PropertyAlias]\nSET [YearsOld] = @Age\nWHERE [Id] = @Id"
        );
    }

    #[test]
    fn generated_column_is_still_updatable() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<PropertyGenerated>();

        let command = mssql()
            .make_update_command(
                &params(&[
                    ("Id", SqlValue::Int(5)),
                    ("Name", "Foo".to_sql_value()),
                    ("Created", SqlValue::Null),
                ]),
                &schema,
            )
            .unwrap();

        assert_eq!(
            command.text(),
            "UPDATE [PropertyGenerated]\nSET [Name] = @Name, [Created] = @Created\nWHERE [Id] = @Id"
        );
    }

    #[test]
    fn computed_column_is_never_updated() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<PropertyComputed>();

        let command = mssql()
            .make_update_command(
                &params(&[("Id", SqlValue::Int(5)), ("Name", "Foo".to_sql_value())]),
                &schema,
            )
            .unwrap();

        assert_eq!(
            command.text(),
            "UPDATE [PropertyComputed]\nSET [Name] = @Name\nWHERE [Id] = @Id"
        );
    }

    #[test]
    fn missing_key_value_is_rejected() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let result =
            mssql().make_update_command(&params(&[("Name", "Foo".to_sql_value())]), &schema);

        assert!(result.is_err());
    }
}

mod delete {
    use super::*;

    #[test]
    fn by_primary_key() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_delete_by_pk_command(5.into(), &schema).unwrap();

        assert_eq!(
            command,
            SqlCommand::with_params(
                "DELETE FROM [Dogs]\nWHERE [Id] = @Id",
                params(&[("Id", SqlValue::Int(5))]),
            )
        );
    }

    #[test]
    fn range_requires_where_prefix() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        assert!(mssql().make_delete_range_command("", &[], &schema).is_err());
        assert!(mssql().make_delete_range_command("   ", &[], &schema).is_err());
        assert!(mssql()
            .make_delete_range_command("Age > @Age", &[], &schema)
            .is_err());
    }

    #[test]
    fn range_with_where_clause() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql()
            .make_delete_range_command(
                "WHERE Age > @Age",
                &params(&[("Age", SqlValue::Int(10))]),
                &schema,
            )
            .unwrap();

        assert_eq!(
            command,
            SqlCommand::with_params(
                "DELETE FROM [Dogs]\nWHERE Age > @Age",
                params(&[("Age", SqlValue::Int(10))]),
            )
        );
    }

    #[test]
    fn delete_all_is_unconditional() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let command = mssql().make_delete_all_command(&schema);

        assert_eq!(command, SqlCommand::new("DELETE FROM [Dogs]"));
    }
}

mod temp_tables {
    use super::*;

    #[test]
    fn create_renders_dialect_column_types() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<TempDog>();

        let command = mssql().make_create_temp_table_command(&schema).unwrap();

        assert_eq!(
            command.text(),
            "CREATE TABLE [#Dogs]\n(\n    [Id] BIGINT,\n    [Name] NVARCHAR(MAX),\n    [Age] INT\n)"
        );
    }

    #[test]
    fn create_requires_temp_prefix() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        assert!(mssql().make_create_temp_table_command(&schema).is_err());
        assert!(mssql().make_drop_temp_table_command(&schema).is_err());
    }

    #[test]
    fn create_requires_columns() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<TempNoColumns>();

        assert!(mssql().make_create_temp_table_command(&schema).is_err());
    }

    #[test]
    fn drop_by_name() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<TempDog>();

        let command = mssql().make_drop_temp_table_command(&schema).unwrap();

        assert_eq!(command, SqlCommand::new("DROP TABLE [#Dogs]"));
    }

    #[test]
    fn postgres_uses_create_temp_table_and_prefix() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<PgTempDog>();

        let command = PostgresDialect::new()
            .make_create_temp_table_command(&schema)
            .unwrap();

        assert_eq!(
            command.text(),
            "CREATE TEMP TABLE \"temp_dogs\"\n(\n    \"Id\" BIGINT,\n    \"Name\" TEXT\n)"
        );

        let dog = factory.get_table_schema::<TempDog>();
        assert!(PostgresDialect::new()
            .make_create_temp_table_command(&dog)
            .is_err());
    }
}

mod where_clause {
    use super::*;

    #[test]
    fn empty_conditions_render_nothing() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();
        let conditions = factory.get_conditions_schema(&schema, &[]).unwrap();

        assert_eq!(mssql().make_where_clause(&conditions), "");
    }

    #[test]
    fn single_condition() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();
        let conditions = factory
            .get_conditions_schema(&schema, &params(&[("Name", "Foo".to_sql_value())]))
            .unwrap();

        assert_eq!(mssql().make_where_clause(&conditions), "WHERE [Name] = @Name");
    }

    #[test]
    fn multiple_conditions_join_with_and() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();
        let conditions = factory
            .get_conditions_schema(
                &schema,
                &params(&[("Name", "Foo".to_sql_value()), ("Age", SqlValue::Int(10))]),
            )
            .unwrap();

        assert_eq!(
            mssql().make_where_clause(&conditions),
            "WHERE [Name] = @Name AND [Age] = @Age"
        );
    }

    #[test]
    fn null_condition_renders_is_null_without_parameter() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();
        let conditions = factory
            .get_conditions_schema(&schema, &params(&[("Name", SqlValue::Null)]))
            .unwrap();

        assert_eq!(mssql().make_where_clause(&conditions), "WHERE [Name] IS NULL");
        assert!(conditions.parameters().is_empty());
    }

    #[test]
    fn aliased_member_filters_on_column_name() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<PropertyAlias>();
        let conditions = factory
            .get_conditions_schema(&schema, &params(&[("Age", SqlValue::Int(10))]))
            .unwrap();

        assert_eq!(
            mssql().make_where_clause(&conditions),
            "WHERE [YearsOld] = @Age"
        );
    }

    #[test]
    fn unknown_member_is_rejected() {
        let factory = SchemaFactory::default();
        let schema = factory.get_table_schema::<Dog>();

        let result =
            factory.get_conditions_schema(&schema, &params(&[("Breed", "Lab".to_sql_value())]));

        assert!(result.is_err());
    }
}
