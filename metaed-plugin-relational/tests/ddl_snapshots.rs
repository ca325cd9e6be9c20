//! DDL generated through the full pipeline.

use metaed_core::SemVer;
use metaed_model::{ModelBuilder, PluginId, PropertyKind};
use metaed_pipeline::{CompilationContext, MetaEdEnvironment, Pipeline};
use metaed_plugin_relational::{PostgresqlPlugin, RelationalPlugin, SqlServerPlugin};
use metaed_plugin_unified::UnifiedPlugin;

fn school_model() -> ModelBuilder {
    ModelBuilder::new()
        .core_namespace("EdFi")
        .domain_entity("School")
        .identity(PropertyKind::Integer, "SchoolId")
}

fn student_school_model() -> ModelBuilder {
    school_model()
        .domain_entity("Student")
        .identity(PropertyKind::String, "StudentUniqueId")
        .association("StudentSchoolAssociation")
        .identity(PropertyKind::DomainEntity, "Student")
        .identity(PropertyKind::DomainEntity, "School")
        .identity(PropertyKind::Date, "EntryDate")
}

fn compile(model: ModelBuilder, plugin: PluginId, version: SemVer) -> CompilationContext {
    let environment =
        MetaEdEnvironment::new(model.build().unwrap(), SemVer::new(5, 0, 0)).with_plugin_version(plugin, version);
    let ctx = Pipeline::new()
        .plugin(UnifiedPlugin)
        .plugin(RelationalPlugin)
        .plugin(PostgresqlPlugin)
        .plugin(SqlServerPlugin)
        .run(environment)
        .unwrap();
    assert_eq!(ctx.error_count(), 0);
    ctx
}

fn script<'a>(ctx: &'a CompilationContext, plugin: PluginId, file_name: &str) -> &'a str {
    &ctx.output(plugin, file_name)
        .unwrap_or_else(|| panic!("no {file_name} for {plugin}"))
        .result_string
}

#[test]
fn test_postgresql_tables() {
    let ctx = compile(student_school_model(), PluginId::EdfiOdsPostgresql, SemVer::new(5, 4, 0));
    insta::assert_snapshot!(script(&ctx, PluginId::EdfiOdsPostgresql, "0020-Tables.sql"), @r"
    CREATE TABLE edfi.school (
        schoolid INT NOT NULL,
        createdate TIMESTAMP NOT NULL,
        lastmodifieddate TIMESTAMP NOT NULL,
        id UUID NOT NULL,
        CONSTRAINT school_pk PRIMARY KEY (schoolid)
    );

    CREATE TABLE edfi.student (
        studentuniqueid VARCHAR(255) NOT NULL,
        createdate TIMESTAMP NOT NULL,
        lastmodifieddate TIMESTAMP NOT NULL,
        id UUID NOT NULL,
        CONSTRAINT student_pk PRIMARY KEY (studentuniqueid)
    );

    CREATE TABLE edfi.studentschoolassociation (
        studentuniqueid VARCHAR(255) NOT NULL,
        schoolid INT NOT NULL,
        entrydate DATE NOT NULL,
        createdate TIMESTAMP NOT NULL,
        lastmodifieddate TIMESTAMP NOT NULL,
        id UUID NOT NULL,
        CONSTRAINT studentschoolassociation_pk PRIMARY KEY (studentuniqueid, schoolid, entrydate)
    );

    ALTER TABLE edfi.studentschoolassociation ADD CONSTRAINT fk_studentschoolassociation_student FOREIGN KEY (studentuniqueid)
    REFERENCES edfi.student (studentuniqueid);

    ALTER TABLE edfi.studentschoolassociation ADD CONSTRAINT fk_studentschoolassociation_school FOREIGN KEY (schoolid)
    REFERENCES edfi.school (schoolid);
    ");
}

#[test]
fn test_delete_tracking_file_follows_target_version() {
    let changes = compile(school_model(), PluginId::EdfiOdsPostgresql, SemVer::new(5, 4, 0));
    assert!(changes.output(PluginId::EdfiOdsPostgresql, "0200-CreateTrackedChangeTables.sql").is_some());
    assert!(changes.output(PluginId::EdfiOdsPostgresql, "0050-CreateTrackedDeleteTables.sql").is_none());

    let deletes = compile(school_model(), PluginId::EdfiOdsPostgresql, SemVer::new(5, 3, 9));
    assert!(deletes.output(PluginId::EdfiOdsPostgresql, "0050-CreateTrackedDeleteTables.sql").is_some());
    assert!(deletes.output(PluginId::EdfiOdsPostgresql, "0200-CreateTrackedChangeTables.sql").is_none());
}

#[test]
fn test_postgresql_change_tracking() {
    let ctx = compile(school_model(), PluginId::EdfiOdsPostgresql, SemVer::new(5, 4, 0));
    insta::assert_snapshot!(script(&ctx, PluginId::EdfiOdsPostgresql, "0200-CreateTrackedChangeTables.sql"), @r"
    CREATE SCHEMA IF NOT EXISTS tracked_changes_edfi;

    CREATE TABLE tracked_changes_edfi.school (
        oldschoolid INT NOT NULL,
        id UUID NOT NULL,
        changeversion BIGINT NOT NULL,
        CONSTRAINT school_pk PRIMARY KEY (changeversion)
    );

    CREATE OR REPLACE FUNCTION tracked_changes_edfi.school_tr_deletetracking()
        RETURNS trigger AS
    $BODY$
    BEGIN
        INSERT INTO tracked_changes_edfi.school (oldschoolid, id, changeversion)
        VALUES (OLD.schoolid, OLD.id, nextval('changes.changeversionsequence'));
        RETURN NULL;
    END;
    $BODY$ LANGUAGE plpgsql;

    CREATE TRIGGER school_tr_deletetracking AFTER DELETE ON edfi.school
        FOR EACH ROW EXECUTE PROCEDURE tracked_changes_edfi.school_tr_deletetracking();
    ");
}

#[test]
fn test_sql_server_tracked_deletes() {
    let ctx = compile(school_model(), PluginId::EdfiOdsSqlServer, SemVer::new(5, 3, 9));
    insta::assert_snapshot!(script(&ctx, PluginId::EdfiOdsSqlServer, "0050-CreateTrackedDeleteTables.sql"), @r"
    IF NOT EXISTS (SELECT * FROM sys.schemas WHERE name = 'tracked_deletes_edfi') EXEC sp_executesql N'CREATE SCHEMA [tracked_deletes_edfi]';
    GO

    CREATE TABLE [tracked_deletes_edfi].[School] (
        [SchoolId] [INT] NOT NULL,
        [Id] [UNIQUEIDENTIFIER] NOT NULL,
        [ChangeVersion] [BIGINT] NOT NULL,
        CONSTRAINT [School_PK] PRIMARY KEY ([ChangeVersion])
    );
    GO

    CREATE TRIGGER [edfi].[edfi_School_TR_DeleteTracking] ON [edfi].[School] AFTER DELETE AS
    BEGIN
        SET NOCOUNT ON
        INSERT INTO [tracked_deletes_edfi].[School] ([SchoolId], [Id], [ChangeVersion])
        SELECT d.[SchoolId], d.[Id], (NEXT VALUE FOR [changes].[ChangeVersionSequence])
        FROM deleted d
    END
    GO
    ");
}

#[test]
fn test_extension_files_are_prefixed() {
    let model = student_school_model()
        .extension_namespace("Sample", "Sample")
        .domain_entity_extension("EdFi.Student")
        .optional(PropertyKind::String, "PetName");
    let ctx = compile(model, PluginId::EdfiOdsSqlServer, SemVer::new(6, 1, 0));

    insta::assert_snapshot!(script(&ctx, PluginId::EdfiOdsSqlServer, "0020-EXTENSION-Sample-Tables.sql"), @r"
    CREATE TABLE [sample].[StudentExtension] (
        [StudentUniqueId] [NVARCHAR](255) NOT NULL,
        [PetName] [NVARCHAR](255) NULL,
        [CreateDate] [DATETIME2](7) NOT NULL,
        CONSTRAINT [StudentExtension_PK] PRIMARY KEY CLUSTERED ([StudentUniqueId] ASC)
    );
    GO

    ALTER TABLE [sample].[StudentExtension] ADD CONSTRAINT [FK_StudentExtension_Student] FOREIGN KEY ([StudentUniqueId])
    REFERENCES [edfi].[Student] ([StudentUniqueId]);
    GO
    ");
    assert!(ctx.output(PluginId::EdfiOdsSqlServer, "0200-EXTENSION-Sample-CreateTrackedChangeTables.sql").is_none());
}
