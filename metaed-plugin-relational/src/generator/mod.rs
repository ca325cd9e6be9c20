//! DDL generation for the PostgreSQL and SQL Server targets.

mod sql_builder;

use eyre::Result;
use metaed_core::GeneratedOutput;
use metaed_model::Namespace;
use metaed_pipeline::{Generator, MetaEdEnvironment};
use tracing::debug;

pub use sql_builder::SqlBuilder;

use crate::technology::{DeleteTracking, DeleteTrackingStyle, PhysicalTable, Technology};

/// Writes `CREATE TABLE` scripts, foreign keys, and delete tracking scripts
/// for every namespace that has tables.
pub struct TableGenerator {
    technology: Technology,
}

impl TableGenerator {
    pub fn new(technology: Technology) -> Self {
        Self { technology }
    }

    fn ident(&self, name: &str) -> String {
        self.technology.quote(&self.technology.identifier(&[name]))
    }

    fn end_statement(&self, sql: &mut SqlBuilder) {
        if self.technology == Technology::SqlServer {
            sql.push_line("GO");
        }
        sql.push_blank();
    }

    fn tables_script(&self, tables: &[PhysicalTable]) -> String {
        let technology = self.technology;
        let mut sql = SqlBuilder::new();

        for table in tables {
            let qualified = technology.qualified(&table.key.schema, &table.name);
            let mut lines: Vec<String> = table
                .columns
                .iter()
                .map(|c| {
                    let null = if c.is_nullable { "NULL" } else { "NOT NULL" };
                    format!("{} {} {}", technology.quote(&c.name), c.data_type, null)
                })
                .collect();
            lines.extend(self.audit_columns(table.is_aggregate_root));

            let keys: Vec<String> = table
                .primary_key_columns()
                .map(|c| match technology {
                    Technology::Postgresql => c.name.clone(),
                    Technology::SqlServer => format!("{} ASC", technology.quote(&c.name)),
                })
                .collect();
            let clustered = match technology {
                Technology::Postgresql => "",
                Technology::SqlServer => " CLUSTERED",
            };
            lines.push(format!(
                "CONSTRAINT {} PRIMARY KEY{clustered} ({})",
                technology.quote(&table.primary_key_name),
                keys.join(", ")
            ));

            sql.push_line(&format!("CREATE TABLE {qualified} ("))
                .push_indent()
                .push_list(lines)
                .push_dedent()
                .push_line(");");
            self.end_statement(&mut sql);
        }

        for table in tables {
            let qualified = technology.qualified(&table.key.schema, &table.name);
            for fk in &table.foreign_keys {
                let columns: Vec<String> = fk.columns.iter().map(|c| technology.quote(c)).collect();
                let foreign_columns: Vec<String> = fk.foreign_columns.iter().map(|c| technology.quote(c)).collect();
                sql.push_line(&format!(
                    "ALTER TABLE {qualified} ADD CONSTRAINT {} FOREIGN KEY ({})",
                    technology.quote(&fk.name),
                    columns.join(", ")
                ))
                .push_line(&format!(
                    "REFERENCES {} ({});",
                    technology.qualified(&fk.foreign_schema, &fk.foreign_table),
                    foreign_columns.join(", ")
                ));
                self.end_statement(&mut sql);
            }
        }
        sql.build()
    }

    fn audit_columns(&self, is_aggregate_root: bool) -> Vec<String> {
        let (timestamp, uuid) = match self.technology {
            Technology::Postgresql => ("TIMESTAMP", "UUID"),
            Technology::SqlServer => ("[DATETIME2](7)", "[UNIQUEIDENTIFIER]"),
        };
        let mut columns = vec![format!("{} {timestamp} NOT NULL", self.ident("CreateDate"))];
        if is_aggregate_root {
            columns.push(format!("{} {timestamp} NOT NULL", self.ident("LastModifiedDate")));
            columns.push(format!("{} {uuid} NOT NULL", self.ident("Id")));
        }
        columns
    }

    fn tracking_script(&self, tracked: &[DeleteTracking]) -> String {
        let technology = self.technology;
        let mut sql = SqlBuilder::new();

        let mut schemas: Vec<&str> = tracked.iter().map(|t| t.schema.as_str()).collect();
        schemas.dedup();
        for schema in schemas {
            match technology {
                Technology::Postgresql => sql.push_line(&format!("CREATE SCHEMA IF NOT EXISTS {schema};")),
                Technology::SqlServer => sql.push_line(&format!(
                    "IF NOT EXISTS (SELECT * FROM sys.schemas WHERE name = '{schema}') EXEC sp_executesql N'CREATE SCHEMA [{schema}]';"
                )),
            };
            self.end_statement(&mut sql);
        }

        let (uuid, bigint) = match technology {
            Technology::Postgresql => ("UUID", "BIGINT"),
            Technology::SqlServer => ("[UNIQUEIDENTIFIER]", "[BIGINT]"),
        };
        for tracking in tracked {
            let table = technology.qualified(&tracking.schema, &tracking.table_name);
            let mut lines: Vec<String> = tracking
                .columns
                .iter()
                .map(|c| format!("{} {} NOT NULL", technology.quote(&c.name), c.data_type))
                .collect();
            lines.push(format!("{} {uuid} NOT NULL", self.ident("Id")));
            lines.push(format!("{} {bigint} NOT NULL", self.ident("ChangeVersion")));
            lines.push(format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                self.ident(&format!("{}_PK", tracking.table_name)),
                self.ident("ChangeVersion")
            ));
            sql.push_line(&format!("CREATE TABLE {table} ("))
                .push_indent()
                .push_list(lines)
                .push_dedent()
                .push_line(");");
            self.end_statement(&mut sql);
            self.trigger(&mut sql, tracking);
        }
        sql.build()
    }

    fn trigger(&self, sql: &mut SqlBuilder, tracking: &DeleteTracking) {
        let technology = self.technology;
        let source = technology.qualified(&tracking.source_schema, &tracking.source_table);
        let target = technology.qualified(&tracking.schema, &tracking.table_name);
        let mut targets: Vec<String> = tracking.columns.iter().map(|c| technology.quote(&c.name)).collect();
        targets.push(self.ident("Id"));
        targets.push(self.ident("ChangeVersion"));

        match technology {
            Technology::Postgresql => {
                let function = format!("{}.{}", tracking.schema, tracking.trigger_name);
                let mut values: Vec<String> = tracking
                    .columns
                    .iter()
                    .map(|c| format!("OLD.{}", self.ident(&c.column_id)))
                    .collect();
                values.push(format!("OLD.{}", self.ident("Id")));
                values.push("nextval('changes.changeversionsequence')".to_string());

                sql.push_line(&format!("CREATE OR REPLACE FUNCTION {function}()"))
                    .push_indent()
                    .push_line("RETURNS trigger AS")
                    .push_dedent()
                    .push_line("$BODY$")
                    .push_line("BEGIN")
                    .push_indent()
                    .push_line(&format!("INSERT INTO {target} ({})", targets.join(", ")))
                    .push_line(&format!("VALUES ({});", values.join(", ")))
                    .push_line("RETURN NULL;")
                    .push_dedent()
                    .push_line("END;")
                    .push_line("$BODY$ LANGUAGE plpgsql;");
                sql.push_blank();
                sql.push_line(&format!(
                    "CREATE TRIGGER {} AFTER DELETE ON {source}",
                    tracking.trigger_name
                ))
                .push_indent()
                .push_line(&format!("FOR EACH ROW EXECUTE PROCEDURE {function}();"))
                .push_dedent();
            }
            Technology::SqlServer => {
                let mut values: Vec<String> = tracking
                    .columns
                    .iter()
                    .map(|c| format!("d.{}", self.ident(&c.column_id)))
                    .collect();
                values.push(format!("d.{}", self.ident("Id")));
                values.push("(NEXT VALUE FOR [changes].[ChangeVersionSequence])".to_string());

                sql.push_line(&format!(
                    "CREATE TRIGGER {} ON {source} AFTER DELETE AS",
                    technology.qualified(&tracking.source_schema, &tracking.trigger_name)
                ))
                .push_line("BEGIN")
                .push_indent()
                .push_line("SET NOCOUNT ON")
                .push_line(&format!("INSERT INTO {target} ({})", targets.join(", ")))
                .push_line(&format!("SELECT {}", values.join(", ")))
                .push_line("FROM deleted d")
                .push_dedent()
                .push_line("END");
            }
        }
        self.end_statement(sql);
    }
}

/// `0020-Tables.sql` for core, `0020-EXTENSION-Sample-Tables.sql` for an extension.
fn file_name(namespace: &Namespace, file: &str) -> String {
    let Some((number, rest)) = file.split_once('-') else {
        return file.to_string();
    };
    if namespace.is_extension {
        let project = if namespace.project_extension.is_empty() {
            &namespace.name
        } else {
            &namespace.project_extension
        };
        format!("{number}-EXTENSION-{project}-{rest}")
    } else {
        file.to_string()
    }
}

impl Generator for TableGenerator {
    fn name(&self) -> &'static str {
        match self.technology {
            Technology::Postgresql => "PostgresqlTableGenerator",
            Technology::SqlServer => "SqlServerTableGenerator",
        }
    }

    fn generate(&self, environment: &MetaEdEnvironment) -> Result<Vec<GeneratedOutput>> {
        let mut outputs = Vec::new();
        for namespace in environment.repository.namespaces() {
            let Some(database) = self.technology.database(&namespace.data) else {
                continue;
            };
            if database.tables.is_empty() {
                continue;
            }
            outputs.push(GeneratedOutput::new(
                "ODS Tables",
                &namespace.name,
                self.technology.folder_name(),
                file_name(namespace, "0020-Tables.sql"),
                self.tables_script(&database.tables),
            ));

            if let Some(style) = database.delete_tracking.first().map(|t| t.style) {
                let name = match style {
                    DeleteTrackingStyle::TrackedChanges => "Change Query Delete Tracking",
                    DeleteTrackingStyle::TrackedDeletes => "Delete Tracking",
                };
                outputs.push(GeneratedOutput::new(
                    name,
                    &namespace.name,
                    self.technology.folder_name(),
                    file_name(namespace, style.file_name()),
                    self.tracking_script(&database.delete_tracking),
                ));
            }
            debug!(namespace = %namespace.name, generator = self.name(), "DDL generated");
        }
        Ok(outputs)
    }
}
