//! Entity and property kinds.

use std::fmt;

use serde::Serialize;

/// The kind of a top level model construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    AbstractEntity,
    Association,
    AssociationExtension,
    AssociationSubclass,
    Choice,
    Common,
    Descriptor,
    Domain,
    DomainEntity,
    DomainEntityExtension,
    DomainEntitySubclass,
    Enumeration,
    Interchange,
    InterchangeExtension,
    SchoolYearEnumeration,
    SharedDecimal,
    SharedInteger,
    SharedShort,
    SharedString,
    Subdomain,
}

impl EntityKind {
    pub const ALL: [EntityKind; 20] = [
        EntityKind::AbstractEntity,
        EntityKind::Association,
        EntityKind::AssociationExtension,
        EntityKind::AssociationSubclass,
        EntityKind::Choice,
        EntityKind::Common,
        EntityKind::Descriptor,
        EntityKind::Domain,
        EntityKind::DomainEntity,
        EntityKind::DomainEntityExtension,
        EntityKind::DomainEntitySubclass,
        EntityKind::Enumeration,
        EntityKind::Interchange,
        EntityKind::InterchangeExtension,
        EntityKind::SchoolYearEnumeration,
        EntityKind::SharedDecimal,
        EntityKind::SharedInteger,
        EntityKind::SharedShort,
        EntityKind::SharedString,
        EntityKind::Subdomain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::AbstractEntity => "abstractEntity",
            EntityKind::Association => "association",
            EntityKind::AssociationExtension => "associationExtension",
            EntityKind::AssociationSubclass => "associationSubclass",
            EntityKind::Choice => "choice",
            EntityKind::Common => "common",
            EntityKind::Descriptor => "descriptor",
            EntityKind::Domain => "domain",
            EntityKind::DomainEntity => "domainEntity",
            EntityKind::DomainEntityExtension => "domainEntityExtension",
            EntityKind::DomainEntitySubclass => "domainEntitySubclass",
            EntityKind::Enumeration => "enumeration",
            EntityKind::Interchange => "interchange",
            EntityKind::InterchangeExtension => "interchangeExtension",
            EntityKind::SchoolYearEnumeration => "schoolYearEnumeration",
            EntityKind::SharedDecimal => "sharedDecimal",
            EntityKind::SharedInteger => "sharedInteger",
            EntityKind::SharedShort => "sharedShort",
            EntityKind::SharedString => "sharedString",
            EntityKind::Subdomain => "subdomain",
        }
    }

    /// Kinds an entity of this kind may name as its base.
    ///
    /// Empty for kinds that neither subclass nor extend.
    pub fn base_kinds(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::DomainEntitySubclass => {
                &[EntityKind::DomainEntity, EntityKind::AbstractEntity]
            }
            EntityKind::AssociationSubclass => &[EntityKind::Association],
            EntityKind::DomainEntityExtension => {
                &[EntityKind::DomainEntity, EntityKind::DomainEntitySubclass]
            }
            EntityKind::AssociationExtension => {
                &[EntityKind::Association, EntityKind::AssociationSubclass]
            }
            EntityKind::InterchangeExtension => &[EntityKind::Interchange],
            EntityKind::Subdomain => &[EntityKind::Domain],
            _ => &[],
        }
    }

    /// Name of the diagnostic raised when this kind's base cannot be resolved.
    pub fn unresolved_base_validator(&self) -> &'static str {
        match self {
            EntityKind::DomainEntitySubclass => {
                "DomainEntitySubclassIdentifierMustMatchADomainOrAbstractEntity"
            }
            EntityKind::AssociationSubclass => "AssociationSubclassIdentifierMustMatchAnAssociation",
            EntityKind::DomainEntityExtension => {
                "DomainEntityExtensionIdentifierMustMatchADomainEntityOrDomainEntitySubclass"
            }
            EntityKind::AssociationExtension => {
                "AssociationExtensionIdentifierMustMatchAnAssociationOrAssociationSubclass"
            }
            EntityKind::InterchangeExtension => {
                "InterchangeExtensionIdentifierMustMatchAnInterchange"
            }
            EntityKind::Subdomain => "SubdomainParentDomainNameMustMatchADomain",
            _ => "BaseEntityMustExist",
        }
    }

    pub fn is_subclass(&self) -> bool {
        matches!(
            self,
            EntityKind::DomainEntitySubclass | EntityKind::AssociationSubclass
        )
    }

    pub fn is_extension(&self) -> bool {
        matches!(
            self,
            EntityKind::DomainEntityExtension
                | EntityKind::AssociationExtension
                | EntityKind::InterchangeExtension
        )
    }

    /// Kinds whose instances are API resources or ODS tables in their own right.
    pub fn is_top_level_resource(&self) -> bool {
        matches!(
            self,
            EntityKind::AbstractEntity
                | EntityKind::Association
                | EntityKind::AssociationSubclass
                | EntityKind::Descriptor
                | EntityKind::DomainEntity
                | EntityKind::DomainEntitySubclass
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a property declared on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Association,
    Boolean,
    Choice,
    Common,
    Currency,
    Date,
    Datetime,
    Decimal,
    Descriptor,
    DomainEntity,
    Duration,
    Enumeration,
    InlineCommon,
    Integer,
    Percent,
    SchoolYearEnumeration,
    SharedDecimal,
    SharedInteger,
    SharedShort,
    SharedString,
    Short,
    String,
    Time,
    Year,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Association => "association",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Choice => "choice",
            PropertyKind::Common => "common",
            PropertyKind::Currency => "currency",
            PropertyKind::Date => "date",
            PropertyKind::Datetime => "datetime",
            PropertyKind::Decimal => "decimal",
            PropertyKind::Descriptor => "descriptor",
            PropertyKind::DomainEntity => "domainEntity",
            PropertyKind::Duration => "duration",
            PropertyKind::Enumeration => "enumeration",
            PropertyKind::InlineCommon => "inlineCommon",
            PropertyKind::Integer => "integer",
            PropertyKind::Percent => "percent",
            PropertyKind::SchoolYearEnumeration => "schoolYearEnumeration",
            PropertyKind::SharedDecimal => "sharedDecimal",
            PropertyKind::SharedInteger => "sharedInteger",
            PropertyKind::SharedShort => "sharedShort",
            PropertyKind::SharedString => "sharedString",
            PropertyKind::Short => "short",
            PropertyKind::String => "string",
            PropertyKind::Time => "time",
            PropertyKind::Year => "year",
        }
    }

    /// Entity kinds a property of this kind may reference.
    ///
    /// Empty for simple properties.
    pub fn target_kinds(&self) -> &'static [EntityKind] {
        match self {
            PropertyKind::DomainEntity => &[
                EntityKind::DomainEntity,
                EntityKind::DomainEntitySubclass,
                EntityKind::AbstractEntity,
            ],
            PropertyKind::Association => {
                &[EntityKind::Association, EntityKind::AssociationSubclass]
            }
            PropertyKind::Descriptor => &[EntityKind::Descriptor],
            PropertyKind::Enumeration => &[EntityKind::Enumeration],
            PropertyKind::SchoolYearEnumeration => &[EntityKind::SchoolYearEnumeration],
            PropertyKind::Common | PropertyKind::InlineCommon => &[EntityKind::Common],
            PropertyKind::Choice => &[EntityKind::Choice],
            PropertyKind::SharedDecimal => &[EntityKind::SharedDecimal],
            PropertyKind::SharedInteger => &[EntityKind::SharedInteger],
            PropertyKind::SharedShort => &[EntityKind::SharedShort],
            PropertyKind::SharedString => &[EntityKind::SharedString],
            _ => &[],
        }
    }

    /// Name of the diagnostic raised when this kind's target cannot be resolved.
    pub fn unresolved_reference_validator(&self) -> &'static str {
        match self {
            PropertyKind::DomainEntity => "DomainEntityPropertyMustMatchADomainEntity",
            PropertyKind::Association => "AssociationPropertyMustMatchAnAssociation",
            PropertyKind::Descriptor => "DescriptorPropertyMustMatchADescriptor",
            PropertyKind::Enumeration => "EnumerationPropertyMustMatchAnEnumeration",
            PropertyKind::SchoolYearEnumeration => {
                "SchoolYearEnumerationPropertyMustMatchASchoolYearEnumeration"
            }
            PropertyKind::Common => "CommonPropertyMustMatchACommon",
            PropertyKind::InlineCommon => "InlineCommonPropertyMustMatchAnInlineCommon",
            PropertyKind::Choice => "ChoicePropertyMustMatchAChoice",
            PropertyKind::SharedDecimal => "SharedDecimalPropertyMustMatchASharedDecimal",
            PropertyKind::SharedInteger => "SharedIntegerPropertyMustMatchASharedInteger",
            PropertyKind::SharedShort => "SharedShortPropertyMustMatchASharedShort",
            PropertyKind::SharedString => "SharedStringPropertyMustMatchASharedString",
            _ => "ReferencedEntityMustExist",
        }
    }

    /// References to domain entities and associations, which carry identity across entities.
    pub fn is_referential(&self) -> bool {
        matches!(self, PropertyKind::DomainEntity | PropertyKind::Association)
    }

    /// Any property that links to another entity.
    pub fn is_reference(&self) -> bool {
        !self.target_kinds().is_empty()
    }

    pub fn is_shared_simple(&self) -> bool {
        matches!(
            self,
            PropertyKind::SharedDecimal
                | PropertyKind::SharedInteger
                | PropertyKind::SharedShort
                | PropertyKind::SharedString
        )
    }

    /// Properties whose value is a single scalar in every target representation.
    pub fn is_simple(&self) -> bool {
        !self.is_reference() || self.is_shared_simple()
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared cardinality of a property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    #[default]
    Required,
    Optional,
    RequiredCollection,
    OptionalCollection,
}

impl Cardinality {
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Cardinality::RequiredCollection | Cardinality::OptionalCollection
        )
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Cardinality::Required | Cardinality::RequiredCollection
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_are_distinct() {
        let mut kinds = EntityKind::ALL.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_base_kinds() {
        assert_eq!(
            EntityKind::DomainEntitySubclass.base_kinds(),
            &[EntityKind::DomainEntity, EntityKind::AbstractEntity]
        );
        assert!(EntityKind::DomainEntity.base_kinds().is_empty());
    }

    #[test]
    fn test_domain_entity_reference_does_not_target_associations() {
        let targets = PropertyKind::DomainEntity.target_kinds();
        assert!(targets.contains(&EntityKind::DomainEntitySubclass));
        assert!(!targets.contains(&EntityKind::Association));
    }

    #[test]
    fn test_simple_kinds() {
        assert!(PropertyKind::Integer.is_simple());
        assert!(PropertyKind::SharedString.is_simple());
        assert!(PropertyKind::SharedString.is_reference());
        assert!(!PropertyKind::Descriptor.is_simple());
        assert!(PropertyKind::Association.is_referential());
        assert!(!PropertyKind::Common.is_referential());
    }

    #[test]
    fn test_cardinality() {
        assert!(Cardinality::RequiredCollection.is_collection());
        assert!(Cardinality::RequiredCollection.is_required());
        assert!(!Cardinality::Optional.is_required());
        assert!(!Cardinality::default().is_collection());
    }
}
